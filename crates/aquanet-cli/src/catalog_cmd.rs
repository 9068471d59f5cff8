//! Catalog commands: `route`, `path`, `action`, `catalog`, `permissions`.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use serde::Serialize;

use aquanet_core::catalog;
use aquanet_core::{
    UnmappedPolicy, permission_for_action, permission_for_path, permission_for_route,
};

#[derive(Debug, Serialize)]
struct CatalogEntry {
    key: &'static str,
    permission: &'static str,
}

#[derive(Debug, Serialize)]
struct CatalogDump {
    routes: Vec<CatalogEntry>,
    actions: Vec<CatalogEntry>,
}

/// `aquanet route <route>`: exact route lookup.
pub fn route(route: &str, policy: UnmappedPolicy, out: &mut impl Write) -> anyhow::Result<()> {
    describe(out, route, permission_for_route(route), policy)
}

/// `aquanet path <location>`: longest-prefix lookup for a concrete location.
pub fn path(location: &str, policy: UnmappedPolicy, out: &mut impl Write) -> anyhow::Result<()> {
    describe(out, location, permission_for_path(location), policy)
}

/// `aquanet action <id>`: in-page action lookup.
pub fn action(action: &str, policy: UnmappedPolicy, out: &mut impl Write) -> anyhow::Result<()> {
    describe(out, action, permission_for_action(action), policy)
}

/// `aquanet permissions`: one distinct permission name per line.
pub fn permissions(out: &mut impl Write) -> anyhow::Result<()> {
    for name in catalog::required_permissions() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

fn describe(
    out: &mut impl Write,
    key: &str,
    permission: Option<&str>,
    policy: UnmappedPolicy,
) -> anyhow::Result<()> {
    match (permission, policy) {
        (Some(name), _) => writeln!(out, "{key}: {name}")?,
        (None, UnmappedPolicy::Allow) => writeln!(out, "{key}: no permission required (allowed)")?,
        (None, UnmappedPolicy::Deny) => writeln!(out, "{key}: unmapped (denied)")?,
    }
    Ok(())
}

/// `aquanet catalog [--json]`: every route and action mapping.
pub fn list(json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let dump = CatalogDump {
        routes: entries(catalog::routes()),
        actions: entries(catalog::actions()),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&dump)?)?;
        return Ok(());
    }

    let width = dump
        .routes
        .iter()
        .chain(&dump.actions)
        .map(|e| e.key.len())
        .max()
        .unwrap_or(0);
    writeln!(out, "Routes:")?;
    for e in &dump.routes {
        writeln!(out, "  {:<width$}  {}", e.key, e.permission)?;
    }
    writeln!(out, "Actions:")?;
    for e in &dump.actions {
        writeln!(out, "  {:<width$}  {}", e.key, e.permission)?;
    }
    Ok(())
}

fn entries(pairs: impl Iterator<Item = (&'static str, &'static str)>) -> Vec<CatalogEntry> {
    pairs
        .map(|(key, permission)| CatalogEntry { key, permission })
        .collect()
}
