//! `AquaNet` CLI
//!
//! Inspect the route/action permission catalog and dry-run the route guard.

use std::io::{self, Write};

use clap::Parser;
use tracing::debug;

use aquanet_cli::cli::{Cli, Command, apply_cli_overrides};
use aquanet_cli::{catalog_cmd, check_cmd, config_cmd};
use aquanet_core::config::load_config;
use aquanet_core::tracing_init::init_from_config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    init_from_config(&config.logging);
    debug!(version = env!("CARGO_PKG_VERSION"), "Starting aquanet CLI");

    let policy = config.guard.unmapped_policy;
    let mut out = io::stdout().lock();
    match cli.command {
        Command::Route { route } => catalog_cmd::route(&route, policy, &mut out)?,
        Command::Path { location } => catalog_cmd::path(&location, policy, &mut out)?,
        Command::Action { action } => catalog_cmd::action(&action, policy, &mut out)?,
        Command::Catalog { json } => catalog_cmd::list(json, &mut out)?,
        Command::Permissions => catalog_cmd::permissions(&mut out)?,
        Command::Check(args) => check_cmd::run(args, &config.guard, &mut out)?,
        Command::Config => config_cmd::run(&config, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
