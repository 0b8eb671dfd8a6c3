//! Project initialization.
//!
//! Writes a default `cssweave.toml` into the project root.

use crate::{config::ProjectConfig, log};
use anyhow::{Context, Result, bail};
use std::fs;

/// Write the default configuration to `config.config_path`.
pub fn new_project(config: &ProjectConfig) -> Result<()> {
    let path = &config.config_path;
    if path.exists() {
        bail!(
            "Config file `{}` already exists. Remove it manually or init in a different path.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(&ProjectConfig::default())?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    log!("init"; "wrote {}", path.display());

    Ok(())
}
