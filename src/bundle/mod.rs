//! Minimal module-graph host.
//!
//! Walks the static import graph from a set of entries, runs every module
//! through the plugin hooks, and collects the files plugins emit. Program
//! modules themselves are not bundled or rewritten.
//!
//! # Graph walk
//!
//! ```text
//! entries ─► layer 0 ─► layer 1 ─► ... ─► build_end (all plugins)
//!              │
//!              ├── load + transform   (parallel, rayon)
//!              └── resolve imports    (sequential, module order)
//! ```
//!
//! Resolution order within a layer is fixed, so the output does not depend on
//! thread scheduling.

mod error;
mod output;
mod scan;

pub use error::BundleError;
pub use output::{BuildOutput, EmittedFiles, OutputArtifact};
pub use scan::scan_imports;

use crate::{
    debug,
    plugin::{EmittedFile, ModuleId, Plugin, PluginContext, ReferenceId, ResolveOptions, ResolvedId},
};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Extensions tried, in order, for extensionless relative specifiers.
const IMPLICIT_EXTENSIONS: &[&str] = &[".js", ".mjs", "/index.js"];

/// Runs builds with a fixed plugin list.
pub struct Bundler {
    root: PathBuf,
    plugins: Vec<Box<dyn Plugin>>,
    pool: Option<rayon::ThreadPool>,
}

impl Bundler {
    pub fn new(root: impl Into<PathBuf>, plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            root: root.into(),
            plugins,
            pool: None,
        }
    }

    /// Use a dedicated pool of `jobs` threads (0 keeps the global pool).
    pub fn with_jobs(mut self, jobs: usize) -> Result<Self> {
        if jobs > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("failed to create build thread pool")?;
            self.pool = Some(pool);
        }
        Ok(self)
    }

    /// Build the graph reachable from `entries` and finalize all plugins.
    pub fn build(&self, entries: &[String]) -> Result<BuildOutput> {
        let host = Host {
            bundler: self,
            graph: RwLock::default(),
            files: EmittedFiles::default(),
        };

        let mut seen = FxHashSet::default();
        let mut layer = Vec::new();
        for entry in entries {
            let options = ResolveOptions {
                is_entry: true,
                skip_self: false,
            };
            let resolved = host
                .resolve(entry, None, options, &[])?
                .filter(|r| !r.external)
                .ok_or_else(|| BundleError::UnresolvedEntry(entry.clone()))?;
            if seen.insert(resolved.id.clone()) {
                layer.push(resolved.id);
            }
        }

        let mut depth = 0;
        while !layer.is_empty() {
            debug!("graph"; "layer {}: {} modules", depth, layer.len());
            depth += 1;
            let loaded: Vec<Result<(ModuleId, Vec<String>)>> = self.install(|| {
                layer
                    .par_iter()
                    .map(|id| -> Result<(ModuleId, Vec<String>)> {
                        let code = host.load_and_transform(id)?;
                        Ok((id.clone(), scan_imports(&code)))
                    })
                    .collect()
            });

            let mut next = Vec::new();
            for result in loaded {
                let (id, specifiers) = result?;
                let imports = host.resolve_imports(&id, &specifiers)?;
                for import in &imports {
                    if !import.external && seen.insert(import.id.clone()) {
                        next.push(import.id.clone());
                    }
                }
                host.record(id, imports);
            }
            layer = next;
        }

        for (index, plugin) in self.plugins.iter().enumerate() {
            plugin
                .build_end(&host.context(index, &[]))
                .with_context(|| format!("[plugin {}] build_end", plugin.name()))?;
        }

        Ok(BuildOutput {
            artifacts: host.files.into_artifacts()?,
            module_count: seen.len(),
        })
    }

    fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

/// State of one build run.
struct Host<'a> {
    bundler: &'a Bundler,
    /// Module → resolved static imports, in source order.
    graph: RwLock<FxHashMap<ModuleId, Vec<ModuleId>>>,
    files: EmittedFiles,
}

impl<'a> Host<'a> {
    fn context<'h>(&'h self, plugin: usize, skip: &[usize]) -> HookContext<'h, 'a> {
        HookContext {
            host: self,
            plugin,
            skip: skip.to_vec(),
        }
    }

    /// Ask each plugin in order (except skipped ones), then fall back to
    /// file resolution.
    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&ModuleId>,
        options: ResolveOptions,
        skip: &[usize],
    ) -> Result<Option<ResolvedId>> {
        for (index, plugin) in self.bundler.plugins.iter().enumerate() {
            if skip.contains(&index) {
                continue;
            }
            let resolved = plugin
                .resolve_id(&self.context(index, skip), specifier, importer, options)
                .with_context(|| format!("[plugin {}] resolve_id `{specifier}`", plugin.name()))?;
            if resolved.is_some() {
                return Ok(resolved);
            }
        }
        Ok(self.resolve_file(specifier, importer))
    }

    /// Default resolution of relative and absolute specifiers on disk.
    fn resolve_file(&self, specifier: &str, importer: Option<&ModuleId>) -> Option<ResolvedId> {
        if !is_path_specifier(specifier) {
            return None;
        }

        let base = match importer {
            _ if Path::new(specifier).is_absolute() => PathBuf::from(specifier),
            Some(importer) => Path::new(importer.as_str())
                .parent()
                .unwrap_or(Path::new(""))
                .join(specifier),
            None => self.bundler.root.join(specifier),
        };
        let base = clean_path(&base);

        std::iter::once(base.clone())
            .chain(IMPLICIT_EXTENSIONS.iter().map(|ext| {
                let mut candidate = base.clone().into_os_string();
                candidate.push(ext);
                PathBuf::from(candidate)
            }))
            .find(|candidate| candidate.is_file())
            .map(|found| ResolvedId::new(found.to_string_lossy().into_owned()))
    }

    fn resolve_imports(&self, importer: &ModuleId, specifiers: &[String]) -> Result<Vec<ResolvedId>> {
        let mut imports: Vec<ResolvedId> = Vec::with_capacity(specifiers.len());
        for specifier in specifiers {
            let resolved = match self.resolve(specifier, Some(importer), ResolveOptions::default(), &[])? {
                Some(resolved) => resolved,
                None if is_path_specifier(specifier) => {
                    return Err(BundleError::UnresolvedImport {
                        specifier: specifier.clone(),
                        importer: importer.to_string(),
                    }
                    .into());
                }
                None => {
                    debug!("resolve"; "treating `{}` as external", specifier);
                    ResolvedId::external(specifier.as_str())
                }
            };
            if !imports.iter().any(|i| i.id == resolved.id) {
                imports.push(resolved);
            }
        }
        Ok(imports)
    }

    fn load_and_transform(&self, id: &ModuleId) -> Result<String> {
        let plugins = &self.bundler.plugins;

        let mut code = None;
        for (index, plugin) in plugins.iter().enumerate() {
            code = plugin
                .load(&self.context(index, &[]), id)
                .with_context(|| format!("[plugin {}] load `{id}`", plugin.name()))?;
            if code.is_some() {
                break;
            }
        }
        let mut code = match code {
            Some(code) => code,
            None => fs::read_to_string(id.as_str())
                .map_err(|err| BundleError::Io(PathBuf::from(id.as_str()), err))?,
        };

        for (index, plugin) in plugins.iter().enumerate() {
            if let Some(output) = plugin
                .transform(&self.context(index, &[]), &code, id)
                .with_context(|| format!("[plugin {}] transform `{id}`", plugin.name()))?
            {
                code = output.code;
            }
        }

        Ok(code)
    }

    fn record(&self, id: ModuleId, imports: Vec<ResolvedId>) {
        let imports = imports.into_iter().map(|i| i.id).collect();
        self.graph.write().insert(id, imports);
    }
}

/// The [`PluginContext`] handed to one plugin during one hook call.
struct HookContext<'h, 'a> {
    host: &'h Host<'a>,
    plugin: usize,
    /// Plugins excluded from nested resolution.
    skip: Vec<usize>,
}

impl PluginContext for HookContext<'_, '_> {
    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&ModuleId>,
        options: ResolveOptions,
    ) -> Result<Option<ResolvedId>> {
        let mut skip = self.skip.clone();
        if options.skip_self {
            skip.push(self.plugin);
        }
        self.host.resolve(specifier, importer, options, &skip)
    }

    fn emit_file(&self, file: EmittedFile) -> Result<ReferenceId> {
        Ok(self.host.files.emit(file)?)
    }

    fn set_asset_source(&self, reference: ReferenceId, source: String) -> Result<()> {
        Ok(self.host.files.set_source(reference, source)?)
    }

    fn module_dependencies(&self, id: &ModuleId) -> Option<Vec<ModuleId>> {
        self.host.graph.read().get(id).cloned()
    }
}

fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || Path::new(specifier).is_absolute()
}

/// Lexically resolve `.` and `..` without touching the file system.
fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
