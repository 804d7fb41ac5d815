// ABOUTME: Manifest types and parsing for machine-images.yml.
// ABOUTME: Handles YAML parsing, discovery, and per-resource validation.

mod deserialize;
mod init;
mod resource;

pub use init::init_config;
pub use resource::{Action, ImageResource};

use crate::error::{Error, Result};
use deserialize::deserialize_images;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "machine-images.yml";
pub const CONFIG_FILENAME_ALT: &str = "machine-images.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".machine-image/config.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Default wait timeout for transfers without their own.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(deserialize_with = "deserialize_images")]
    pub images: NonEmpty<ImageResource>,
}

impl Manifest {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }
}
