//! Build orchestration.
//!
//! ```text
//! build_project()
//!     │
//!     ├── plugins: [ignore, css]
//!     ├── Bundler::build(entries) ──► BuildOutput
//!     └── write to [build.output], or print on dry run
//! ```

use crate::{
    bundle::{BuildOutput, Bundler},
    config::ProjectConfig,
    log,
    plugin::{ArtifactKind, CssPlugin, IgnorePlugin, Plugin},
};
use anyhow::{Context, Result};

/// Plugins in hook order. The ignore plugin runs first so stubbed imports
/// never reach stylesheet handling.
pub fn plugins(config: &ProjectConfig) -> Result<Vec<Box<dyn Plugin>>> {
    let ignore = IgnorePlugin::new(config.ignore.compile()?);
    let css = CssPlugin::new(config.css.to_options());
    Ok(vec![Box::new(ignore), Box::new(css)])
}

/// Build the project described by `config`.
///
/// With `dry_run`, artifacts are printed instead of written.
pub fn build_project(config: &ProjectConfig, dry_run: bool) -> Result<BuildOutput> {
    let bundler = Bundler::new(&config.root, plugins(config)?).with_jobs(config.build.jobs)?;

    log!("build"; "walking {} entries", config.build.entries.len());
    let output = bundler
        .build(&config.entry_specifiers())
        .context("build failed")?;

    let assets = output.artifacts.iter().filter(|a| a.kind == ArtifactKind::Asset).count();
    log!(
        "build";
        "{} modules, {} stylesheets, {} loaders",
        output.module_count,
        assets,
        output.artifacts.len() - assets
    );

    if dry_run {
        print_artifacts(&output);
    } else {
        output.write(&config.build.output, config.build.clean)?;
        log!("build"; "done");
    }

    Ok(output)
}

/// Dry run: list every artifact, with loader bodies inline.
fn print_artifacts(output: &BuildOutput) {
    for artifact in &output.artifacts {
        log!(artifact.kind.name(); "{}", artifact.file_name);
        if artifact.kind == ArtifactKind::Chunk {
            for line in artifact.source.lines() {
                println!("    {line}");
            }
        }
    }
}
