//! Print the effective configuration.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use aquanet_core::Config;
use aquanet_core::config::global_config_path;

/// Print `config` as JSON, preceded by where the global file is looked up.
pub fn run(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    match global_config_path() {
        Some(path) => writeln!(out, "# global config: {}", path.display())?,
        None => writeln!(out, "# global config: unavailable on this platform")?,
    }
    writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
    Ok(())
}
