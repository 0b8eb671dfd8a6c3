//! cssweave - stylesheet artifacts and loader modules for module-graph builds.

use anyhow::{Result, bail};
use clap::Parser;
use cssweave::{
    build::build_project,
    cli::{Cli, Commands},
    config::ProjectConfig,
    init::new_project,
    logger,
};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Init => new_project(&config),
        Commands::Build { .. } => build_project(&config, cli.is_dry_run()).map(|_| ()),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        ProjectConfig::from_path(&config_path)?
    } else {
        ProjectConfig::default()
    };
    config.update_with_cli(cli);

    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}
