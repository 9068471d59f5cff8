//! Configuration resolution for `AquaNet`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/aquanet/settings.json`)
//! 3. Explicit config file (e.g. `--config`)
//! 4. Environment variables
//! 5. CLI arguments (applied by the binary, highest priority)
//!
//! Files may set any subset of fields; unset fields keep the value from the
//! previous layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::UnmappedPolicy;
use crate::error::{Error, Result};
use crate::guard::DEFAULT_REDIRECT;

/// Complete `AquaNet` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Route guard behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Where denied navigation without a fallback is sent.
    pub redirect_to: String,
    /// Treatment of routes and actions missing from the catalog.
    pub unmapped_policy: UnmappedPolicy,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            redirect_to: DEFAULT_REDIRECT.to_string(),
            unmapped_policy: UnmappedPolicy::Allow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// On-disk shape: every field optional so a file can override a subset.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    guard: GuardFile,
    #[serde(default)]
    logging: LoggingFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GuardFile {
    redirect_to: Option<String>,
    unmapped_policy: Option<UnmappedPolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingFile {
    level: Option<String>,
    json: Option<bool>,
}

/// Load configuration with hierarchical resolution.
///
/// A missing global file is skipped; a missing `explicit` file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    load_config_with(explicit, global_config_path().as_deref(), |name| {
        std::env::var(name).ok()
    })
}

/// [`load_config`] with the global path and environment supplied by the
/// caller.
pub fn load_config_with(
    explicit: Option<&Path>,
    global: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global.filter(|p| p.exists()) {
        merge_file(&mut config, load_config_file(global_path)?);
        debug!(path = %global_path.display(), "Loaded global config");
    }

    if let Some(path) = explicit {
        merge_file(&mut config, load_config_file(path)?);
        debug!(path = %path.display(), "Loaded config file");
    }

    apply_env_overrides(&mut config, var)?;
    config.validate()?;
    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aquanet").join("settings.json"))
}

impl Config {
    /// Reject values the guard cannot act on.
    pub fn validate(&self) -> Result<()> {
        if !self.guard.redirect_to.starts_with('/') {
            return Err(Error::Config(format!(
                "redirect_to must be an absolute path, got {:?}",
                self.guard.redirect_to
            )));
        }
        Ok(())
    }
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn merge_file(base: &mut Config, overlay: ConfigFile) {
    if let Some(redirect_to) = overlay.guard.redirect_to {
        base.guard.redirect_to = redirect_to;
    }
    if let Some(policy) = overlay.guard.unmapped_policy {
        base.guard.unmapped_policy = policy;
    }
    if let Some(level) = overlay.logging.level {
        base.logging.level = level;
    }
    if let Some(json) = overlay.logging.json {
        base.logging.json = json;
    }
}

/// Apply `AQUANET_*` overrides. `var` looks up an environment variable.
pub fn apply_env_overrides(
    config: &mut Config,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = var("AQUANET_REDIRECT_TO") {
        config.guard.redirect_to = val;
    }
    if let Some(val) = var("AQUANET_UNMAPPED_POLICY") {
        config.guard.unmapped_policy = val.parse()?;
    }
    if let Some(val) = var("AQUANET_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = var("AQUANET_LOG_JSON") {
        config.logging.json = parse_bool("AQUANET_LOG_JSON", &val)?;
    }
    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!(
            "{name} must be a boolean (true/false), got {value:?}"
        ))),
    }
}
