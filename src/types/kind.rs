// ABOUTME: Enumerations describing how an image is transferred.
// ABOUTME: Image kind (tar/raw), verification mode, and export compression.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-disk flavour of an image, selecting the Tar or Raw transfer method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    #[default]
    Tar,
    Raw,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Tar => "tar",
            ImageKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pulled image is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    No,
    Checksum,
    #[default]
    Signature,
}

impl VerifyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyMode::No => "no",
            VerifyMode::Checksum => "checksum",
            VerifyMode::Signature => "signature",
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression applied to an exported image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Uncompressed,
    Xz,
    Bzip2,
    Gzip,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Uncompressed => "uncompressed",
            ExportFormat::Xz => "xz",
            ExportFormat::Bzip2 => "bzip2",
            ExportFormat::Gzip => "gzip",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
