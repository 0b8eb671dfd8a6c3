//! Host-side build errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the module-graph host itself (plugins report through `anyhow`).
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("could not resolve entry `{0}`")]
    UnresolvedEntry(String),

    #[error("could not resolve `{specifier}` imported by `{importer}`")]
    UnresolvedImport { specifier: String, importer: String },

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("file name `{0}` is already taken by another emitted file")]
    FileNameConflict(String),

    #[error("unknown file reference {0}")]
    UnknownReference(String),

    #[error("emitted file `{0}` never received its source")]
    MissingSource(String),
}
