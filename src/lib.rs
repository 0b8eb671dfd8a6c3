//! cssweave: per-importer stylesheet aggregation for module-graph builds.
//!
//! Every stylesheet imported by a program module becomes two output files: the
//! stylesheet itself and a small loader module that imports it, followed by the
//! stylesheets of the importer's direct dependencies. Loading the loader keeps
//! the cascade in step with the import order of the program.
//!
//! The [`plugin`] module holds the hook contract and the plugins, [`bundle`] a
//! minimal host that drives them over a real directory.

pub mod build;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod init;
pub mod logger;
pub mod plugin;
pub mod utils;
