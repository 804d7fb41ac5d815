// ABOUTME: A declared machine image resource and the action to converge it.
// ABOUTME: Carries every property the actions read, with their defaults.

use crate::transfer::WaitMode;
use crate::types::{ExportFormat, ImageKind, ImageName, VerifyMode};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do with a declared image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Pull,
    Import,
    Export,
    Clone,
    Rename,
    Remove,
    SetProperties,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Pull => "pull",
            Action::Import => "import",
            Action::Export => "export",
            Action::Clone => "clone",
            Action::Rename => "rename",
            Action::Remove => "remove",
            Action::SetProperties => "set_properties",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageResource {
    pub name: ImageName,

    #[serde(default)]
    pub action: Action,

    #[serde(default = "default_wait")]
    pub wait: bool,

    #[serde(default, rename = "type")]
    pub kind: ImageKind,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub verify: VerifyMode,

    #[serde(default)]
    pub limit_bytes: Option<u64>,

    /// Unset leaves the flag alone for `set_properties` and means writable elsewhere.
    #[serde(default)]
    pub read_only: Option<bool>,

    #[serde(default)]
    pub from: Option<ImageName>,

    #[serde(default)]
    pub to: Option<ImageName>,

    #[serde(default)]
    pub force: bool,

    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub format: ExportFormat,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

fn default_wait() -> bool {
    true
}

impl ImageResource {
    /// A resource with every property at its default.
    pub fn new(name: ImageName, action: Action) -> Self {
        Self {
            name,
            action,
            wait: default_wait(),
            kind: ImageKind::default(),
            source: None,
            verify: VerifyMode::default(),
            limit_bytes: None,
            read_only: None,
            from: None,
            to: None,
            force: false,
            path: None,
            format: ExportFormat::default(),
            timeout: None,
        }
    }

    /// Source image for clone and rename; defaults to the resource name.
    pub fn from(&self) -> &ImageName {
        self.from.as_ref().unwrap_or(&self.name)
    }

    /// Destination image for clone and rename; defaults to the resource name.
    pub fn to(&self) -> &ImageName {
        self.to.as_ref().unwrap_or(&self.name)
    }

    pub fn read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Wait behaviour, with the resource timeout taking precedence over `default_timeout`.
    pub fn wait_mode(&self, default_timeout: Option<Duration>) -> WaitMode {
        WaitMode::new(self.wait, self.timeout.or(default_timeout))
    }

    /// Check that the properties this action needs are present and coherent.
    pub fn validate(&self) -> Result<(), String> {
        match self.action {
            Action::Pull if self.source.is_none() => {
                Err(format!("{}: pull requires 'source'", self.name))
            }
            Action::Import | Action::Export if self.path.is_none() => {
                Err(format!("{}: {} requires 'path'", self.name, self.action))
            }
            Action::Clone | Action::Rename if self.from() == self.to() => Err(format!(
                "{}: {} needs distinct 'from' and 'to' (both are {})",
                self.name,
                self.action,
                self.from()
            )),
            _ => Ok(()),
        }
    }
}
