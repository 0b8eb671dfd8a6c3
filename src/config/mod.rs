//! Project configuration management for `cssweave.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                      |
//! |-------------|----------------------------------------------|
//! | `[build]`   | Entry modules, output directory, threads     |
//! | `[css]`     | Stylesheet suffixes, artifact name patterns  |
//! | `[ignore]`  | Imports replaced by an empty stub module     |
//!
//! # Example
//!
//! ```toml
//! [build]
//! entries = ["src/index.js", "src/common/index.js"]
//! output = "dist"
//!
//! [css]
//! stylesheet_file_names = "styles/[name]/index[extname]"
//!
//! [ignore]
//! patterns = ['\.svg$']
//! ```

mod build;
pub mod defaults;
mod error;
mod plugins;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use plugins::{CssConfig, IgnoreConfig};

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing cssweave.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute project root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Stylesheet plugin settings
    #[serde(default)]
    pub css: CssConfig,

    /// Stub-redirection settings
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

impl ProjectConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments and make all paths absolute.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        self.root = Self::normalize_path(&root);
        self.config_path = Self::normalize_path(&self.root.join(&cli.config));

        if let Commands::Build { build_args } = &cli.command {
            Self::update_option(&mut self.build.output, build_args.output.as_ref());
            Self::update_option(&mut self.build.jobs, build_args.jobs.as_ref());
            self.build.clean |= build_args.clean;
        }

        self.build.output = Self::normalize_path(&self.root.join(&self.build.output));
        self.build.entries = self
            .build
            .entries
            .iter()
            .map(|entry| Self::normalize_path(&self.root.join(entry)))
            .collect();
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Entry paths as module specifiers for the host.
    pub fn entry_specifiers(&self) -> Vec<String> {
        self.build
            .entries
            .iter()
            .map(|entry| entry.to_string_lossy().into_owned())
            .collect()
    }

    /// Validate configuration before a build
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if self.build.entries.is_empty() {
            bail!(ConfigError::Validation(
                "[build.entries] must have at least one element".into()
            ));
        }
        if let Some(missing) = self.build.entries.iter().find(|entry| !entry.is_file()) {
            bail!(ConfigError::Validation(format!(
                "[build.entries] `{}` not found",
                missing.display()
            )));
        }
        if self.build.output == self.root {
            bail!(ConfigError::Validation(
                "[build.output] must not be the project root".into()
            ));
        }

        self.css.validate()?;
        self.ignore.compile()?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
