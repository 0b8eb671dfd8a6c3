//! Emitted files: reserved slots, deferred sources, final artifacts.

use super::error::BundleError;
use crate::{
    log,
    plugin::{ArtifactKind, EmittedFile, ReferenceId},
    utils::path,
};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::{fs, path::Path};

#[derive(Debug)]
struct Slot {
    file: EmittedFile,
    source: Option<String>,
}

#[derive(Debug, Default)]
struct Slots {
    slots: Vec<Slot>,
    by_name: FxHashMap<String, ReferenceId>,
}

/// Files reserved by plugins during one build.
///
/// Reserving and filling are separate steps: a slot gets its handle
/// immediately and its source at any later point of the build.
#[derive(Debug, Default)]
pub struct EmittedFiles {
    inner: Mutex<Slots>,
}

impl EmittedFiles {
    /// Reserve a slot. File names must be unique within a build.
    pub fn emit(&self, file: EmittedFile) -> Result<ReferenceId, BundleError> {
        let mut inner = self.inner.lock();
        let file_name = path::normalize(&file.file_name);
        if inner.by_name.contains_key(&file_name) {
            return Err(BundleError::FileNameConflict(file_name));
        }

        let reference = ReferenceId(inner.slots.len() as u32);
        inner.by_name.insert(file_name.clone(), reference);
        inner.slots.push(Slot {
            file: EmittedFile { file_name, ..file },
            source: None,
        });
        Ok(reference)
    }

    /// Fill a reserved slot. Setting it again replaces the source.
    pub fn set_source(&self, reference: ReferenceId, source: String) -> Result<(), BundleError> {
        match self.inner.lock().slots.get_mut(reference.0 as usize) {
            Some(slot) => {
                slot.source = Some(source);
                Ok(())
            }
            None => Err(BundleError::UnknownReference(reference.to_string())),
        }
    }

    /// Final artifacts in reservation order. Every slot must have a source.
    pub fn into_artifacts(self) -> Result<Vec<OutputArtifact>, BundleError> {
        self.inner
            .into_inner()
            .slots
            .into_iter()
            .map(|slot| match slot.source {
                Some(source) => Ok(OutputArtifact {
                    kind: slot.file.kind,
                    file_name: slot.file.file_name,
                    source,
                }),
                None => Err(BundleError::MissingSource(slot.file.file_name)),
            })
            .collect()
    }
}

/// One file of the build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub kind: ArtifactKind,
    /// Output-relative, normalized, `/`-separated.
    pub file_name: String,
    pub source: String,
}

/// Everything a build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub artifacts: Vec<OutputArtifact>,
    /// Number of modules loaded into the graph.
    pub module_count: usize,
}

impl BuildOutput {
    pub fn get(&self, file_name: &str) -> Option<&OutputArtifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }

    /// Write all artifacts below `dir`.
    ///
    /// With `clean`, the directory is removed first.
    pub fn write(&self, dir: &Path, clean: bool) -> Result<()> {
        if clean && dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("failed to clean `{}`", dir.display()))?;
        }

        for artifact in &self.artifacts {
            // File names are normalized, so they cannot climb out of `dir`
            let dest = dir.join(&artifact.file_name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &artifact.source)
                .with_context(|| format!("failed to write `{}`", dest.display()))?;
            log!("write"; "{}", artifact.file_name);
        }

        Ok(())
    }
}
