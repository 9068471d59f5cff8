//! Command-line surface of the `aquanet` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use aquanet_core::{Config, UnmappedPolicy};

use crate::check_cmd::CheckArgs;

#[derive(Parser, Debug)]
#[command(name = "aquanet")]
#[command(version, about = "AquaNet access layer tooling", long_about = None)]
pub struct Cli {
    /// Config file layered over the global settings
    #[arg(long, global = true, env = "AQUANET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Deny routes and actions that have no catalog entry
    #[arg(long, global = true)]
    pub deny_unmapped: bool,

    /// Redirect destination for denied navigation
    #[arg(long, global = true)]
    pub redirect_to: Option<String>,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the permission required by an exact route key
    Route {
        /// Route key, e.g. "/pipes"
        route: String,
    },
    /// Show the permission required by a concrete location
    Path {
        /// Location, e.g. "/tanks/42/edit?tab=log"
        location: String,
    },
    /// Show the permission required by an in-page action
    Action {
        /// Action key, e.g. "export_report"
        action: String,
    },
    /// List every route and action mapping
    Catalog {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the distinct permission names the catalog references
    Permissions,
    /// Dry-run the route guard
    Check(CheckArgs),
    /// Print the effective configuration
    Config,
}

/// Apply command-line flags on top of the loaded configuration. An absent
/// flag leaves the config value alone.
pub fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if cli.deny_unmapped {
        config.guard.unmapped_policy = UnmappedPolicy::Deny;
    }
    if let Some(to) = &cli.redirect_to {
        config.guard.redirect_to.clone_from(to);
    }
    if cli.log_json {
        config.logging.json = true;
    }
}
