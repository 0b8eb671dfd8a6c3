//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cssweave: per-importer stylesheet artifacts and loader modules
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to the root (default: cssweave.toml)
    #[arg(short = 'C', long, default_value = "cssweave.toml", global = true)]
    pub config: PathBuf,

    /// Print per-module plugin activity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments of the build command
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Clean output directory completely before writing
    #[arg(long)]
    pub clean: bool,

    /// Worker threads for loading modules (0 = one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the artifacts instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default cssweave.toml into the root
    Init,

    /// Walk the module graph from the entries and write the stylesheet artifacts
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init)
    }

    pub const fn is_dry_run(&self) -> bool {
        matches!(
            self.command,
            Commands::Build {
                build_args: BuildArgs { dry_run: true, .. }
            }
        )
    }
}
