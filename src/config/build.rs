//! `[build]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in cssweave.toml - graph entries and output.
///
/// # Example
/// ```toml
/// [build]
/// entries = ["src/index.js", "src/common/index.js"]
/// output = "dist"
/// clean = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Entry modules, relative to the project root.
    #[serde(default = "defaults::build::entries")]
    #[educe(Default = defaults::build::entries())]
    pub entries: Vec<PathBuf>,

    /// Output directory for emitted artifacts.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Remove the output directory before writing.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Worker threads for loading modules (0 = one per core).
    #[serde(default = "defaults::build::jobs")]
    #[educe(Default = defaults::build::jobs())]
    pub jobs: usize,
}
