//! `[css]` and `[ignore]` section configuration.

use super::{defaults, error::ConfigError};
use crate::plugin::{CssOptions, FileNamer};
use educe::Educe;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `[css]` section in cssweave.toml - stylesheet detection and naming.
///
/// Name patterns understand `[name]`, `[ext]`, `[extname]` and `[base]`.
///
/// # Example
/// ```toml
/// [css]
/// extensions = [".css", ".pcss"]
/// stylesheet_file_names = "assets/[name][extname]"
/// loader_file_names = "[name].js"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct CssConfig {
    /// Suffixes that mark an import as a stylesheet.
    #[serde(default = "defaults::css::extensions")]
    #[educe(Default = defaults::css::extensions())]
    pub extensions: Vec<String>,

    /// Output name pattern for stylesheet artifacts.
    #[serde(default = "defaults::css::stylesheet_file_names")]
    #[educe(Default = defaults::css::stylesheet_file_names())]
    pub stylesheet_file_names: String,

    /// Output name pattern for loader modules.
    #[serde(default = "defaults::css::loader_file_names")]
    #[educe(Default = defaults::css::loader_file_names())]
    pub loader_file_names: String,
}

impl CssConfig {
    pub fn to_options(&self) -> CssOptions {
        CssOptions {
            extensions: self.extensions.clone(),
            stylesheet_file_names: FileNamer::pattern(&self.stylesheet_file_names),
            loader_file_names: FileNamer::pattern(&self.loader_file_names),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "[css.extensions] must have at least one element".into(),
            ));
        }
        if let Some(ext) = self.extensions.iter().find(|ext| !ext.starts_with('.') || ext.len() < 2) {
            return Err(ConfigError::Validation(format!(
                "[css.extensions] `{ext}` must start with `.`"
            )));
        }

        for (field, pattern) in [
            ("stylesheet_file_names", &self.stylesheet_file_names),
            ("loader_file_names", &self.loader_file_names),
        ] {
            if !pattern.contains("[name]") {
                return Err(ConfigError::Validation(format!(
                    "[css.{field}] must contain `[name]`"
                )));
            }
        }

        Ok(())
    }
}

/// `[ignore]` section - imports redirected to an empty stub module.
///
/// Patterns are regular expressions over the import specifier, with a leading
/// `./` read as `/`. Common glob filters translate as:
///
/// | glob            | regex            |
/// |-----------------|------------------|
/// | `**/*.css`      | `\.css$`         |
/// | `**/*.{png,svg}`| `\.(png\|svg)$`  |
/// | `/fixtures/**`  | `^/fixtures/`    |
///
/// # Example
/// ```toml
/// [ignore]
/// patterns = ['\.css$', '^/fixtures/']
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IgnoreConfig {
    /// Regexes matched against import specifiers.
    pub patterns: Vec<String>,
}

impl IgnoreConfig {
    pub fn compile(&self) -> Result<Vec<Regex>, ConfigError> {
        self.patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| {
                    ConfigError::Validation(format!("[ignore.patterns] `{pattern}`: {err}"))
                })
            })
            .collect()
    }
}
