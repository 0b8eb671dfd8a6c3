//! Stylesheet aggregation plugin.
//!
//! Stylesheets imported from program modules are pulled out of the module
//! graph and emitted as standalone assets. For each one a small loader module
//! is synthesized whose imports replay the cascade order of the program's own
//! import graph.
//!
//! # Lifecycle
//!
//! ```text
//! resolve_id(specifier, importer)   register pair (first importer wins),
//!                                   add importer → pair edge
//! transform(code, id)               capture stylesheet text, return stand-in module
//! build_end()                       write stylesheets, synthesize loaders, clear state
//! ```
//!
//! # Loader ordering
//!
//! Given `index.js` importing `a.css` and `b.js`, where `b.js` imports `c.css`:
//!
//! ```text
//! a.js:  import "./styles/a/index.css";   // own stylesheet
//!        import "./styles/c/index.css";   // via index.js → b.js (one hop)
//! c.js:  import "./styles/c/index.css";
//! ```
//!
//! Chaining follows exactly one hop from the stylesheet's first importer.
//!
//! # Name clashes
//!
//! Distinct stylesheets that share a file name (`button/index.css`,
//! `card/index.css`) get numbered names: `styles/index/index.css` + `index.js`,
//! then `styles/index2/index.css` + `index2.js`, and so on.

mod naming;
mod registry;

pub use naming::{FileNamer, NameParts};
pub use registry::{
    ArtifactPair, CssBuildState, ImporterIndex, LoaderArtifact, OutputNames, PairIndex,
    StylesheetArtifact, StylesheetRegistry,
};

use crate::{
    debug,
    plugin::{
        EmittedFile, ModuleId, Plugin, PluginContext, ResolveOptions, ResolvedId,
        TransformOutput,
    },
    utils::path,
};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fmt::Write;

/// Module body that replaces stylesheet source inside the program graph.
pub const STAND_IN_MODULE: &str = "export default {}";

/// Options for [`CssPlugin`].
#[derive(Debug, Clone)]
pub struct CssOptions {
    /// Suffixes that mark a specifier or module id as a stylesheet.
    pub extensions: Vec<String>,
    pub stylesheet_file_names: FileNamer,
    pub loader_file_names: FileNamer,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            extensions: vec![".css".to_owned()],
            stylesheet_file_names: FileNamer::pattern("styles/[name]/index[extname]"),
            loader_file_names: FileNamer::pattern("[name].js"),
        }
    }
}

impl CssOptions {
    pub fn is_stylesheet(&self, id: &str) -> bool {
        self.extensions.iter().any(|ext| id.ends_with(ext.as_str()))
    }
}

/// Read-only copy of the plugin state, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSnapshot {
    /// Registered stylesheets in registration order.
    pub pairs: Vec<(ModuleId, ArtifactPair)>,
    /// `(importer, stylesheet id)` edges.
    pub edges: Vec<(ModuleId, ModuleId)>,
}

/// The stylesheet plugin. One instance serves one build at a time.
#[derive(Debug, Default)]
pub struct CssPlugin {
    options: CssOptions,
    state: Mutex<CssBuildState>,
}

impl CssPlugin {
    pub fn new(options: CssOptions) -> Self {
        Self {
            options,
            state: Mutex::new(CssBuildState::default()),
        }
    }

    /// Copy of the current state. Edges are grouped by importer, importers
    /// sorted by id.
    pub fn snapshot(&self) -> CssSnapshot {
        let state = self.state.lock();
        let pairs = state
            .registry
            .iter()
            .map(|(id, pair)| (id.clone(), pair.clone()))
            .collect();

        let registry = &state.registry;
        let mut edges: Vec<_> = state
            .importers
            .iter()
            .flat_map(|(importer, indices)| {
                indices
                    .iter()
                    .map(move |&index| (importer.clone(), registry.id(index).clone()))
            })
            .collect();
        // Stable sort keeps each importer's first-seen order
        edges.sort_by(|a, b| a.0.cmp(&b.0));

        CssSnapshot { pairs, edges }
    }

    /// Register `id` (imported by `importer`) and record the edge.
    ///
    /// The whole check-then-insert runs under the state lock, so concurrent
    /// resolutions of the same stylesheet reserve exactly one pair.
    fn register(
        &self,
        ctx: &dyn PluginContext,
        specifier: &str,
        id: &ModuleId,
        importer: &ModuleId,
    ) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let names = &mut state.names;

        let (index, created) = state.registry.get_or_try_insert_with(id, || {
            let (stylesheet_path, loader_path) = self.output_paths(specifier, names);

            let stylesheet = ctx
                .emit_file(EmittedFile::asset(&stylesheet_path))
                .with_context(|| format!("failed to reserve stylesheet `{stylesheet_path}`"))?;
            let loader = ctx
                .emit_file(EmittedFile::chunk(&loader_path))
                .with_context(|| format!("failed to reserve loader `{loader_path}`"))?;
            names.reserve(&stylesheet_path);
            names.reserve(&loader_path);

            Ok(ArtifactPair {
                stylesheet: StylesheetArtifact {
                    reference: stylesheet,
                    importer: importer.clone(),
                    output_path: stylesheet_path,
                    content: String::new(),
                },
                loader: LoaderArtifact {
                    reference: loader,
                    output_path: loader_path,
                },
            })
        })?;

        if created {
            let pair = state.registry.pair(index);
            debug!(
                "css";
                "registered {} as {} (imported by {})",
                id,
                pair.stylesheet.output_path,
                importer
            );
        }
        state.importers.add(importer, index);
        Ok(())
    }

    /// Stylesheet and loader file names for a new registration.
    ///
    /// When either name is already taken, `[name]` gets a numeric suffix
    /// starting at 2 until both are free. A namer that ignores `[name]` keeps
    /// its clashing result, which the host then rejects.
    fn output_paths(&self, specifier: &str, names: &OutputNames) -> (String, String) {
        let mut parts = NameParts::from_specifier(specifier);
        let paths_for = |parts: &NameParts| {
            (
                self.options.stylesheet_file_names.apply(parts),
                self.options.loader_file_names.apply(parts),
            )
        };
        let is_free = |(stylesheet, loader): &(String, String)| {
            !names.is_taken(stylesheet) && !names.is_taken(loader)
        };

        let first = paths_for(&parts);
        if is_free(&first) {
            return first;
        }

        let name = parts.name.clone();
        let mut suffix = 1;
        loop {
            suffix += 1;
            parts.name = format!("{name}{suffix}");
            let paths = paths_for(&parts);
            if paths.0 == first.0 || paths.1 == first.1 {
                return first;
            }
            if is_free(&paths) {
                return paths;
            }
        }
    }
}

/// Body of a loader: its own stylesheet first, then the stylesheets of the
/// modules its importer imports directly.
fn loader_source(
    ctx: &dyn PluginContext,
    state: &CssBuildState,
    pair: &ArtifactPair,
) -> String {
    let loader_path = &pair.loader.output_path;
    let mut source = String::new();
    let mut push = |target: &str| {
        writeln!(source, "import \"{}\";", path::relative(loader_path, target)).ok();
    };

    push(&pair.stylesheet.output_path);

    // No graph info for the importer: only the own stylesheet
    if let Some(dependencies) = ctx.module_dependencies(&pair.stylesheet.importer) {
        for dependency in &dependencies {
            for &index in state.importers.get(dependency.as_str()) {
                push(&state.registry.pair(index).stylesheet.output_path);
            }
        }
    }

    source
}

impl Plugin for CssPlugin {
    fn name(&self) -> &'static str {
        "css"
    }

    fn resolve_id(
        &self,
        ctx: &dyn PluginContext,
        specifier: &str,
        importer: Option<&ModuleId>,
        options: ResolveOptions,
    ) -> Result<Option<ResolvedId>> {
        if !self.options.is_stylesheet(specifier) {
            return Ok(None);
        }

        let resolved = ctx.resolve(
            specifier,
            importer,
            ResolveOptions {
                skip_self: true,
                ..options
            },
        )?;
        let Some(resolved) = resolved else {
            return Ok(None);
        };

        // Entry stylesheets never get artifacts
        if let Some(importer) = importer.filter(|i| !i.as_str().is_empty())
            && !resolved.external
        {
            self.register(ctx, specifier, &resolved.id, importer)?;
        }

        Ok(Some(resolved))
    }

    fn transform(
        &self,
        _ctx: &dyn PluginContext,
        code: &str,
        id: &ModuleId,
    ) -> Result<Option<TransformOutput>> {
        if !self.options.is_stylesheet(id.as_str()) {
            return Ok(None);
        }

        // A repeated transform overwrites the captured text
        if let Some(pair) = self.state.lock().registry.get_mut(id.as_str()) {
            pair.stylesheet.content = code.to_owned();
        }

        Ok(Some(TransformOutput::new(STAND_IN_MODULE)))
    }

    fn build_end(&self, ctx: &dyn PluginContext) -> Result<()> {
        // Taking the state clears it, even if a write below fails
        let state = std::mem::take(&mut *self.state.lock());
        debug!(
            "css";
            "finalizing {} stylesheets from {} importers",
            state.registry.len(),
            state.importers.importer_count()
        );

        for (id, pair) in state.registry.iter() {
            ctx.set_asset_source(pair.stylesheet.reference, pair.stylesheet.content.clone())
                .with_context(|| format!("failed to write stylesheet for `{id}`"))?;

            let source = loader_source(ctx, &state, pair);
            debug!("css"; "{} ->\n{}", pair.loader.output_path, source.trim_end());
            ctx.set_asset_source(pair.loader.reference, source)
                .with_context(|| format!("failed to write loader for `{id}`"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::ReferenceId;
    use anyhow::bail;
    use rustc_hash::{FxHashMap, FxHashSet};

    /// In-memory host: a fixed set of files, a fixed import graph, and a list of
    /// emitted slots.
    #[derive(Default)]
    struct FakeContext {
        files: FxHashSet<String>,
        graph: FxHashMap<ModuleId, Vec<ModuleId>>,
        emitted: Mutex<Vec<(EmittedFile, Option<String>)>>,
        resolve_calls: Mutex<usize>,
    }

    impl FakeContext {
        fn new(files: &[&str]) -> Self {
            Self {
                files: files.iter().map(|f| (*f).to_owned()).collect(),
                ..Default::default()
            }
        }

        fn with_graph(mut self, module: &str, imports: &[&str]) -> Self {
            self.graph
                .insert(module.into(), imports.iter().map(|&i| ModuleId::new(i)).collect());
            self
        }

        fn source_of(&self, file_name: &str) -> Option<String> {
            self.emitted
                .lock()
                .iter()
                .find(|(file, _)| file.file_name == file_name)
                .and_then(|(_, source)| source.clone())
        }

        fn emitted_count(&self) -> usize {
            self.emitted.lock().len()
        }
    }

    impl PluginContext for FakeContext {
        fn resolve(
            &self,
            specifier: &str,
            importer: Option<&ModuleId>,
            options: ResolveOptions,
        ) -> Result<Option<ResolvedId>> {
            assert!(options.skip_self);
            *self.resolve_calls.lock() += 1;
            let dir = importer.map(|i| path::dirname(i.as_str())).unwrap_or_default();
            let id = path::join(&dir, specifier);
            Ok(self.files.contains(&id).then(|| ResolvedId::new(id)))
        }

        fn emit_file(&self, file: EmittedFile) -> Result<ReferenceId> {
            let mut emitted = self.emitted.lock();
            if emitted.iter().any(|(f, _)| f.file_name == file.file_name) {
                bail!("duplicate file name `{}`", file.file_name);
            }
            emitted.push((file, None));
            Ok(ReferenceId(emitted.len() as u32 - 1))
        }

        fn set_asset_source(&self, reference: ReferenceId, source: String) -> Result<()> {
            match self.emitted.lock().get_mut(reference.0 as usize) {
                Some(slot) => {
                    slot.1 = Some(source);
                    Ok(())
                }
                None => bail!("unknown reference {reference}"),
            }
        }

        fn module_dependencies(&self, id: &ModuleId) -> Option<Vec<ModuleId>> {
            self.graph.get(id).cloned()
        }
    }

    fn resolve(plugin: &CssPlugin, ctx: &FakeContext, specifier: &str, importer: &str) -> Option<ResolvedId> {
        let importer = ModuleId::new(importer);
        plugin
            .resolve_id(ctx, specifier, Some(&importer), ResolveOptions::default())
            .unwrap()
    }

    // ============================================================================
    // Interceptor
    // ============================================================================

    #[test]
    fn test_non_stylesheet_is_unhandled() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/b.js"]);
        assert!(resolve(&plugin, &ctx, "./b.js", "src/index.js").is_none());
        assert_eq!(*ctx.resolve_calls.lock(), 0);
    }

    #[test]
    fn test_unresolvable_stylesheet_is_unhandled() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&[]);
        assert!(resolve(&plugin, &ctx, "./missing.css", "src/index.js").is_none());
        assert!(plugin.snapshot().pairs.is_empty());
        assert_eq!(ctx.emitted_count(), 0);
    }

    #[test]
    fn test_resolve_returns_host_identity() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/theme/a.css"]);
        let resolved = resolve(&plugin, &ctx, "./theme/a.css", "src/index.js").unwrap();
        assert_eq!(resolved.id.as_str(), "src/theme/a.css");
    }

    #[test]
    fn test_dedup_many_importers() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css"]);

        for importer in ["src/index.js", "src/b.js", "src/c.js", "src/index.js"] {
            resolve(&plugin, &ctx, "./a.css", importer).unwrap();
        }

        let snapshot = plugin.snapshot();
        assert_eq!(snapshot.pairs.len(), 1);
        // stylesheet + loader
        assert_eq!(ctx.emitted_count(), 2);
        assert_eq!(snapshot.edges.len(), 3);
    }

    #[test]
    fn test_first_importer_wins() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css"]);

        resolve(&plugin, &ctx, "./a.css", "src/late.js");
        resolve(&plugin, &ctx, "./a.css", "src/early.js");

        let snapshot = plugin.snapshot();
        assert_eq!(snapshot.pairs[0].1.stylesheet.importer.as_str(), "src/late.js");
    }

    #[test]
    fn test_entry_stylesheet_is_not_registered() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["a.css"]);

        let entry = plugin
            .resolve_id(&ctx, "./a.css", None, ResolveOptions { is_entry: true, skip_self: false })
            .unwrap();
        assert!(entry.is_some());

        let empty = ModuleId::new("");
        let empty_importer = plugin
            .resolve_id(&ctx, "./a.css", Some(&empty), ResolveOptions::default())
            .unwrap();
        assert!(empty_importer.is_some());

        assert!(plugin.snapshot().pairs.is_empty());
        assert_eq!(ctx.emitted_count(), 0);
    }

    #[test]
    fn test_output_paths_use_specifier_name() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/theme/button.css"]);
        resolve(&plugin, &ctx, "./theme/button.css", "src/index.js");

        let pair = &plugin.snapshot().pairs[0].1;
        assert_eq!(pair.stylesheet.output_path, "styles/button/index.css");
        assert_eq!(pair.loader.output_path, "button.js");
    }

    #[test]
    fn test_custom_file_namers() {
        let plugin = CssPlugin::new(CssOptions {
            extensions: vec![".css".into(), ".pcss".into()],
            stylesheet_file_names: FileNamer::custom(|p| format!("assets/{}{}", p.name, p.extension)),
            loader_file_names: FileNamer::pattern("loaders/[name].mjs"),
        });
        let ctx = FakeContext::new(&["src/x.pcss"]);
        resolve(&plugin, &ctx, "./x.pcss", "src/index.js");

        let pair = &plugin.snapshot().pairs[0].1;
        assert_eq!(pair.stylesheet.output_path, "assets/x.pcss");
        assert_eq!(pair.loader.output_path, "loaders/x.mjs");
    }

    #[test]
    fn test_same_file_name_gets_numbered_paths() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/button/index.css", "src/card/index.css"])
            .with_graph("src/button/index.js", &["src/button/index.css"])
            .with_graph("src/card/index.js", &["src/card/index.css"]);
        resolve(&plugin, &ctx, "./index.css", "src/button/index.js").unwrap();
        resolve(&plugin, &ctx, "./index.css", "src/card/index.js").unwrap();

        let snapshot = plugin.snapshot();
        assert_eq!(snapshot.pairs.len(), 2);
        let paths: Vec<_> = snapshot
            .pairs
            .iter()
            .map(|(_, pair)| (pair.stylesheet.output_path.as_str(), pair.loader.output_path.as_str()))
            .collect();
        assert_eq!(
            paths,
            [("styles/index/index.css", "index.js"), ("styles/index2/index.css", "index2.js")]
        );

        plugin.build_end(&ctx).unwrap();
        assert_eq!(ctx.source_of("index.js").unwrap(), "import \"./styles/index/index.css\";\n");
        assert_eq!(ctx.source_of("index2.js").unwrap(), "import \"./styles/index2/index.css\";\n");
    }

    #[test]
    fn test_numbering_skips_every_taken_name() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css", "src/x/a.css", "src/a2.css", "src/y/a.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js").unwrap();
        resolve(&plugin, &ctx, "./a2.css", "src/index.js").unwrap();
        resolve(&plugin, &ctx, "./x/a.css", "src/index.js").unwrap();
        resolve(&plugin, &ctx, "./y/a.css", "src/index.js").unwrap();

        let loaders: Vec<_> = plugin
            .snapshot()
            .pairs
            .iter()
            .map(|(_, pair)| pair.loader.output_path.clone())
            .collect();
        assert_eq!(loaders, ["a.js", "a2.js", "a3.js", "a4.js"]);
    }

    #[test]
    fn test_namer_ignoring_name_surfaces_host_error() {
        let plugin = CssPlugin::new(CssOptions {
            loader_file_names: FileNamer::pattern("loader.js"),
            ..Default::default()
        });
        let ctx = FakeContext::new(&["src/a.css", "src/b.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js");

        let importer = ModuleId::new("src/index.js");
        let err = plugin
            .resolve_id(&ctx, "./b.css", Some(&importer), ResolveOptions::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("loader.js"));
        assert_eq!(plugin.snapshot().pairs.len(), 1);
    }

    #[test]
    fn test_transform_captures_source() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js");

        let id = ModuleId::new("src/a.css");
        let out = plugin.transform(&ctx, ".a { color: red }", &id).unwrap().unwrap();
        assert_eq!(out.code, STAND_IN_MODULE);
        assert_eq!(plugin.snapshot().pairs[0].1.stylesheet.content, ".a { color: red }");

        // A second transform (rebuild) replaces the text
        plugin.transform(&ctx, ".a { color: blue }", &id).unwrap();
        assert_eq!(plugin.snapshot().pairs[0].1.stylesheet.content, ".a { color: blue }");
    }

    #[test]
    fn test_transform_unregistered_stylesheet_only_stands_in() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&[]);
        let out = plugin
            .transform(&ctx, "body {}", &ModuleId::new("entry.css"))
            .unwrap()
            .unwrap();
        assert_eq!(out.code, STAND_IN_MODULE);
        assert!(plugin.snapshot().pairs.is_empty());
    }

    #[test]
    fn test_transform_ignores_program_modules() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&[]);
        let out = plugin
            .transform(&ctx, "export {}", &ModuleId::new("src/index.js"))
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_concurrent_resolution_reserves_one_pair() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/shared.css"]);

        std::thread::scope(|scope| {
            for n in 0..8 {
                let (plugin, ctx) = (&plugin, &ctx);
                scope.spawn(move || {
                    let importer = format!("src/m{n}.js");
                    for _ in 0..16 {
                        resolve(plugin, ctx, "./shared.css", &importer).unwrap();
                    }
                });
            }
        });

        let snapshot = plugin.snapshot();
        assert_eq!(snapshot.pairs.len(), 1);
        assert_eq!(ctx.emitted_count(), 2);
        assert_eq!(snapshot.edges.len(), 8);
    }

    // ============================================================================
    // Finalizer
    // ============================================================================

    /// `index` imports `a.css` and `b`; `b` imports `c.css`.
    fn one_hop_build() -> (CssPlugin, FakeContext) {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css", "src/c.css"])
            .with_graph("src/index.js", &["src/a.css", "src/b.js"])
            .with_graph("src/b.js", &["src/c.css"])
            .with_graph("src/a.css", &[])
            .with_graph("src/c.css", &[]);

        resolve(&plugin, &ctx, "./a.css", "src/index.js");
        resolve(&plugin, &ctx, "./c.css", "src/b.js");
        plugin.transform(&ctx, ".a {}", &ModuleId::new("src/a.css")).unwrap();
        plugin.transform(&ctx, ".c {}", &ModuleId::new("src/c.css")).unwrap();
        (plugin, ctx)
    }

    #[test]
    fn test_one_hop_chaining() {
        let (plugin, ctx) = one_hop_build();
        plugin.build_end(&ctx).unwrap();

        assert_eq!(ctx.source_of("styles/a/index.css").unwrap(), ".a {}");
        assert_eq!(ctx.source_of("styles/c/index.css").unwrap(), ".c {}");
        assert_eq!(
            ctx.source_of("a.js").unwrap(),
            "import \"./styles/a/index.css\";\nimport \"./styles/c/index.css\";\n"
        );
        assert_eq!(ctx.source_of("c.js").unwrap(), "import \"./styles/c/index.css\";\n");
    }

    #[test]
    fn test_loader_always_starts_with_own_stylesheet() {
        let (plugin, ctx) = one_hop_build();
        plugin.build_end(&ctx).unwrap();

        for (loader, own) in [("a.js", "./styles/a/index.css"), ("c.js", "./styles/c/index.css")] {
            let source = ctx.source_of(loader).unwrap();
            assert_eq!(source.lines().next().unwrap(), format!("import \"{own}\";"));
        }
    }

    #[test]
    fn test_loader_paths_relative_to_nested_loader() {
        let plugin = CssPlugin::new(CssOptions {
            loader_file_names: FileNamer::pattern("styles/[name]/index.js"),
            ..Default::default()
        });
        let ctx = FakeContext::new(&["src/a.css", "src/c.css"])
            .with_graph("src/index.js", &["src/a.css", "src/b.js"])
            .with_graph("src/b.js", &["src/c.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js");
        resolve(&plugin, &ctx, "./c.css", "src/b.js");
        plugin.build_end(&ctx).unwrap();

        assert_eq!(
            ctx.source_of("styles/a/index.js").unwrap(),
            "import \"./index.css\";\nimport \"../c/index.css\";\n"
        );
    }

    #[test]
    fn test_chaining_is_one_hop_only() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css", "src/e.css"])
            .with_graph("src/index.js", &["src/a.css", "src/b.js"])
            .with_graph("src/b.js", &["src/d.js"])
            .with_graph("src/d.js", &["src/e.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js");
        resolve(&plugin, &ctx, "./e.css", "src/d.js");
        plugin.build_end(&ctx).unwrap();

        assert_eq!(ctx.source_of("a.js").unwrap(), "import \"./styles/a/index.css\";\n");
    }

    #[test]
    fn test_missing_graph_info_skips_chaining() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css", "src/c.css"]).with_graph("src/b.js", &["src/c.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js");
        resolve(&plugin, &ctx, "./c.css", "src/b.js");
        plugin.build_end(&ctx).unwrap();

        assert_eq!(ctx.source_of("a.js").unwrap(), "import \"./styles/a/index.css\";\n");
    }

    #[test]
    fn test_untransformed_stylesheet_is_written_empty() {
        let plugin = CssPlugin::default();
        let ctx = FakeContext::new(&["src/a.css"]);
        resolve(&plugin, &ctx, "./a.css", "src/index.js");
        plugin.build_end(&ctx).unwrap();
        assert_eq!(ctx.source_of("styles/a/index.css").unwrap(), "");
    }

    #[test]
    fn test_build_end_clears_state() {
        let (plugin, ctx) = one_hop_build();
        plugin.build_end(&ctx).unwrap();

        let snapshot = plugin.snapshot();
        assert!(snapshot.pairs.is_empty());
        assert!(snapshot.edges.is_empty());

        // A second, independent build starts from scratch
        let ctx = FakeContext::new(&["src/z.css"]).with_graph("src/main.js", &["src/z.css"]);
        resolve(&plugin, &ctx, "./z.css", "src/main.js");
        plugin.build_end(&ctx).unwrap();
        assert_eq!(ctx.emitted_count(), 2);
        assert_eq!(ctx.source_of("z.js").unwrap(), "import \"./styles/z/index.css\";\n");
    }

    #[test]
    fn test_failed_finalize_still_clears_state() {
        struct BrokenWrites(FakeContext);
        impl PluginContext for BrokenWrites {
            fn resolve(&self, s: &str, i: Option<&ModuleId>, o: ResolveOptions) -> Result<Option<ResolvedId>> {
                self.0.resolve(s, i, o)
            }
            fn emit_file(&self, file: EmittedFile) -> Result<ReferenceId> {
                self.0.emit_file(file)
            }
            fn set_asset_source(&self, _: ReferenceId, _: String) -> Result<()> {
                bail!("disk full")
            }
            fn module_dependencies(&self, id: &ModuleId) -> Option<Vec<ModuleId>> {
                self.0.module_dependencies(id)
            }
        }

        let plugin = CssPlugin::default();
        let ctx = BrokenWrites(FakeContext::new(&["src/a.css"]));
        let importer = ModuleId::new("src/index.js");
        plugin
            .resolve_id(&ctx, "./a.css", Some(&importer), ResolveOptions::default())
            .unwrap();

        assert!(plugin.build_end(&ctx).is_err());
        assert!(plugin.snapshot().pairs.is_empty());
    }
}
