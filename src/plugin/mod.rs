//! Hook contract between a module-graph host and its plugins.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  resolve_id / load / transform  ┌──────────────┐
//! │        host          │ ──────────────────────────────► │    Plugin    │
//! │ (module graph owner) │                                 │  (css, ...)  │
//! │                      │ ◄────────────────────────────── │              │
//! └──────────────────────┘  resolve / emit_file /          └──────────────┘
//!                           set_asset_source /
//!                           module_dependencies
//!                           (PluginContext)
//! ```
//!
//! Every hook returns `Ok(None)` for "unhandled": the host then asks the
//! next plugin or falls back to its own default behavior.

pub mod css;
pub mod ignore;

use anyhow::Result;
use std::{borrow::Borrow, fmt, sync::Arc};

pub use css::{CssOptions, CssPlugin, FileNamer, NameParts};
pub use ignore::IgnorePlugin;

// ============================================================================
// Identities
// ============================================================================

/// Fully resolved identity of a module (usually its absolute path).
///
/// Cheap to clone; looks up as `&str` in hash maps.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

/// Opaque handle for a reserved output slot.
///
/// Assigned by the host in [`PluginContext::emit_file`], stable for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceId(pub u32);

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Hook Payloads
// ============================================================================

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: ModuleId,
    /// External modules are recorded in the graph but never loaded.
    pub external: bool,
}

impl ResolvedId {
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }

    pub fn external(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            external: true,
        }
    }
}

/// Options passed along with a resolution request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// The specifier is a build entry point.
    pub is_entry: bool,
    /// Skip the calling plugin when re-entering resolution through the context.
    pub skip_self: bool,
}

/// Replacement source produced by a transform hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
}

impl TransformOutput {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// What an emitted file is, as far as the host is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Opaque payload (stylesheet text).
    Asset,
    /// Synthesized program module.
    Chunk,
}

impl ArtifactKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Chunk => "chunk",
        }
    }
}

/// Descriptor for [`PluginContext::emit_file`].
///
/// Carries no content: the slot is filled later through
/// [`PluginContext::set_asset_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub kind: ArtifactKind,
    /// Output-relative file name, `/`-separated.
    pub file_name: String,
}

impl EmittedFile {
    pub fn asset(file_name: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::Asset,
            file_name: file_name.into(),
        }
    }

    pub fn chunk(file_name: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::Chunk,
            file_name: file_name.into(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Services the host offers to a plugin during a hook call.
pub trait PluginContext: Send + Sync {
    /// Run the host's resolution (other plugins, then default resolution).
    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&ModuleId>,
        options: ResolveOptions,
    ) -> Result<Option<ResolvedId>>;

    /// Reserve an output slot. Its content is set later.
    fn emit_file(&self, file: EmittedFile) -> Result<ReferenceId>;

    /// Set the content of a previously reserved slot.
    fn set_asset_source(&self, reference: ReferenceId, source: String) -> Result<()>;

    /// Static imports of a module, in source order.
    ///
    /// `None` when the host knows nothing about `id`.
    fn module_dependencies(&self, id: &ModuleId) -> Option<Vec<ModuleId>>;
}

/// A build plugin. All hooks default to "unhandled".
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve_id(
        &self,
        _ctx: &dyn PluginContext,
        _specifier: &str,
        _importer: Option<&ModuleId>,
        _options: ResolveOptions,
    ) -> Result<Option<ResolvedId>> {
        Ok(None)
    }

    fn load(&self, _ctx: &dyn PluginContext, _id: &ModuleId) -> Result<Option<String>> {
        Ok(None)
    }

    fn transform(
        &self,
        _ctx: &dyn PluginContext,
        _code: &str,
        _id: &ModuleId,
    ) -> Result<Option<TransformOutput>> {
        Ok(None)
    }

    /// Called once after the whole module graph has been built.
    fn build_end(&self, _ctx: &dyn PluginContext) -> Result<()> {
        Ok(())
    }
}
