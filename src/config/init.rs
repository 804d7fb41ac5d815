// ABOUTME: Manifest scaffolding for new hosts.
// ABOUTME: Writes a commented machine-images.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ImageName;

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, name: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let name = match name {
        Some(n) => ImageName::new(n).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        None => ImageName::new("fedora").map_err(|e| Error::InvalidConfig(e.to_string()))?,
    };

    std::fs::write(&config_path, generate_template_yaml(&name))?;

    Ok(())
}

fn generate_template_yaml(name: &ImageName) -> String {
    format!(
        r#"# Default time to wait for pulls, imports and exports (omit to wait forever)
# timeout: 30m
images:
  - name: {name}
    action: pull
    type: raw
    source: https://download.example.com/{name}.raw.xz
    verify: checksum
  # - name: {name}-base
  #   action: clone
  #   from: {name}
  #   to: {name}-base
  #   read_only: true
"#
    )
}
