// ABOUTME: Validated machine image names.
// ABOUTME: Mirrors the naming rules systemd-machined applies to images.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Longest name machined accepts for an image.
pub const MAX_IMAGE_NAME_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageNameError {
    #[error("image name cannot be empty")]
    Empty,

    #[error("image name exceeds maximum length of {MAX_IMAGE_NAME_LEN} characters")]
    TooLong,

    #[error("image name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("image name cannot be '.' or '..'")]
    Reserved,

    #[error("invalid character in image name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageName(String);

impl ImageName {
    pub fn new(value: &str) -> Result<Self, ImageNameError> {
        if value.is_empty() {
            return Err(ImageNameError::Empty);
        }

        if value.len() > MAX_IMAGE_NAME_LEN {
            return Err(ImageNameError::TooLong);
        }

        if value == "." || value == ".." {
            return Err(ImageNameError::Reserved);
        }

        if let Some(first @ ('.' | '-')) = value.chars().next() {
            return Err(ImageNameError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(ImageNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for ImageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ImageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for ImageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ImageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ImageName::new(&s).map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for ImageName {
    type Err = ImageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageName::new(s)
    }
}
