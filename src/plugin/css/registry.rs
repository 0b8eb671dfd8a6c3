//! Build-scoped bookkeeping for the stylesheet plugin.
//!
//! - [`StylesheetRegistry`]: resolved stylesheet id → one artifact pair.
//! - [`ImporterIndex`]: importing module → pairs it imports directly.
//! - [`OutputNames`]: artifact file names already reserved by this plugin.
//!
//! Dedup happens in the registry only. The index may list the same pair under
//! many importers, but each importer lists it once.

use crate::{
    plugin::{ModuleId, ReferenceId},
    utils::path,
};
use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};

/// Position of a pair in the registry. Stable for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairIndex(usize);

/// Emitted stylesheet: the real payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetArtifact {
    pub reference: ReferenceId,
    /// First module observed importing this stylesheet. Never updated.
    pub importer: ModuleId,
    pub output_path: String,
    /// Source text, filled by the transform hook.
    pub content: String,
}

/// Synthesized loader module that imports stylesheets in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderArtifact {
    pub reference: ReferenceId,
    pub output_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    pub stylesheet: StylesheetArtifact,
    pub loader: LoaderArtifact,
}

/// Registry of unique stylesheets, in first-registration order.
#[derive(Debug, Default)]
pub struct StylesheetRegistry {
    pairs: Vec<(ModuleId, ArtifactPair)>,
    by_id: FxHashMap<ModuleId, PairIndex>,
}

impl StylesheetRegistry {
    /// Return the pair for `id`, creating it with `create` if absent.
    ///
    /// `create` runs at most once per id. The caller must hold exclusive
    /// access for the whole call, which `&mut self` already guarantees.
    pub fn get_or_try_insert_with(
        &mut self,
        id: &ModuleId,
        create: impl FnOnce() -> Result<ArtifactPair>,
    ) -> Result<(PairIndex, bool)> {
        if let Some(&index) = self.by_id.get(id) {
            return Ok((index, false));
        }

        let index = PairIndex(self.pairs.len());
        self.pairs.push((id.clone(), create()?));
        self.by_id.insert(id.clone(), index);
        Ok((index, true))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ArtifactPair> {
        self.by_id.get(id).map(|&index| &mut self.pairs[index.0].1)
    }

    pub fn pair(&self, index: PairIndex) -> &ArtifactPair {
        &self.pairs[index.0].1
    }

    pub fn id(&self, index: PairIndex) -> &ModuleId {
        &self.pairs[index.0].0
    }

    /// Pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ArtifactPair)> {
        self.pairs.iter().map(|(id, pair)| (id, pair))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Direct stylesheet imports per importing module.
#[derive(Debug, Default)]
pub struct ImporterIndex {
    edges: FxHashMap<ModuleId, Vec<PairIndex>>,
}

impl ImporterIndex {
    /// Record that `importer` imports the pair at `index`.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add(&mut self, importer: &ModuleId, index: PairIndex) -> bool {
        let entries = self.edges.entry(importer.clone()).or_default();
        if entries.contains(&index) {
            return false;
        }
        entries.push(index);
        true
    }

    /// Pairs imported directly by `importer`, in first-seen order.
    pub fn get(&self, importer: &str) -> &[PairIndex] {
        self.edges.get(importer).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &[PairIndex])> {
        self.edges.iter().map(|(importer, indices)| (importer, indices.as_slice()))
    }

    pub fn importer_count(&self) -> usize {
        self.edges.len()
    }
}

/// Normalized output file names reserved so far.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: FxHashSet<String>,
}

impl OutputNames {
    pub fn is_taken(&self, file_name: &str) -> bool {
        self.taken.contains(&path::normalize(file_name))
    }

    pub fn reserve(&mut self, file_name: &str) {
        self.taken.insert(path::normalize(file_name));
    }
}

/// Everything the plugin accumulates during one build.
#[derive(Debug, Default)]
pub struct CssBuildState {
    pub registry: StylesheetRegistry,
    pub importers: ImporterIndex,
    pub names: OutputNames,
}
