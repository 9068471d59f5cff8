//! Permission catalog.
//!
//! Maps navigable routes and in-page actions to the backend permission that
//! gates them. The tables ship with the build and must be kept in sync with
//! the backend's permission set when deploying; nothing here validates them
//! at runtime.
//!
//! A key that is absent from a table requires no permission. Whether that
//! means "allowed" is decided by [`UnmappedPolicy`], which defaults to allow.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Backend permission names required by each route.
///
/// Several low-risk screens reuse a read permission instead of having one of
/// their own (`/map` is gated by `leer_tanques`, `/permissions` by
/// `leer_roles`).
pub static ROUTE_PERMISSIONS: &[(&str, &str)] = &[
    ("/tanks", "leer_tanques"),
    ("/tanks/new", "crear_tanques"),
    ("/pipes", "leer_tuberias"),
    ("/pipes/new", "crear_tuberias"),
    ("/connections", "leer_conexiones"),
    ("/connections/new", "crear_conexiones"),
    ("/interventions", "leer_intervenciones"),
    ("/interventions/new", "crear_intervenciones"),
    ("/reports", "leer_reportes"),
    ("/map", "leer_tanques"),
    ("/users", "leer_usuarios"),
    ("/users/new", "crear_usuarios"),
    ("/roles", "leer_roles"),
    ("/permissions", "leer_roles"),
];

/// Backend permission names required by each in-page action.
///
/// Exporting a report only needs read access to reports.
pub static ACTION_PERMISSIONS: &[(&str, &str)] = &[
    ("create_tank", "crear_tanques"),
    ("update_tank", "actualizar_tanques"),
    ("delete_tank", "eliminar_tanques"),
    ("create_pipe", "crear_tuberias"),
    ("update_pipe", "actualizar_tuberias"),
    ("delete_pipe", "eliminar_tuberias"),
    ("create_connection", "crear_conexiones"),
    ("update_connection", "actualizar_conexiones"),
    ("delete_connection", "eliminar_conexiones"),
    ("create_intervention", "crear_intervenciones"),
    ("update_intervention", "actualizar_intervenciones"),
    ("delete_intervention", "eliminar_intervenciones"),
    ("create_report", "crear_reportes"),
    ("export_report", "leer_reportes"),
    ("create_user", "crear_usuarios"),
    ("update_user", "actualizar_usuarios"),
    ("delete_user", "eliminar_usuarios"),
    ("manage_roles", "actualizar_roles"),
];

/// What to do with a route or action that has no catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// No permission required: always allowed.
    #[default]
    Allow,
    /// Treat the missing entry as a denial.
    Deny,
}

impl UnmappedPolicy {
    pub const fn allows_unmapped(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for UnmappedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Deny => f.write_str("deny"),
        }
    }
}

impl FromStr for UnmappedPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(Error::Config(format!(
                "unknown unmapped policy {other:?} (expected \"allow\" or \"deny\")"
            ))),
        }
    }
}

/// Permission required to navigate to `route`, or `None` if the route is unmapped.
pub fn permission_for_route(route: &str) -> Option<&'static str> {
    lookup(ROUTE_PERMISSIONS, route)
}

/// Permission required to perform `action`, or `None` if the action is unmapped.
pub fn permission_for_action(action: &str) -> Option<&'static str> {
    lookup(ACTION_PERMISSIONS, action)
}

/// Permission required for a concrete location such as `/tanks/42/edit?tab=log`.
///
/// Query and fragment are ignored, a trailing `/` is trimmed, and the longest
/// mapped route that is a whole-segment prefix of the path wins. `/tanksx`
/// does not match `/tanks`.
pub fn permission_for_path(path: &str) -> Option<&'static str> {
    let path = strip_location(path);
    ROUTE_PERMISSIONS
        .iter()
        .filter(|(route, _)| matches_route_prefix(route, path))
        .max_by_key(|(route, _)| route.len())
        .map(|&(_, permission)| permission)
}

/// Route table entries in declaration order.
pub fn routes() -> impl Iterator<Item = (&'static str, &'static str)> {
    ROUTE_PERMISSIONS.iter().copied()
}

/// Action table entries in declaration order.
pub fn actions() -> impl Iterator<Item = (&'static str, &'static str)> {
    ACTION_PERMISSIONS.iter().copied()
}

/// Every distinct permission name referenced by either table.
pub fn required_permissions() -> BTreeSet<&'static str> {
    routes()
        .chain(actions())
        .map(|(_, permission)| permission)
        .collect()
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, permission)| permission)
}

fn strip_location(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn matches_route_prefix(route: &str, path: &str) -> bool {
    path.strip_prefix(route)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_mapped_key_has_a_permission() {
        for (key, permission) in routes().chain(actions()) {
            assert!(!permission.is_empty(), "{key} maps to an empty permission");
        }
    }

    #[test]
    fn keys_are_unique() {
        let route_keys: HashSet<_> = routes().map(|(k, _)| k).collect();
        assert_eq!(route_keys.len(), ROUTE_PERMISSIONS.len());
        let action_keys: HashSet<_> = actions().map(|(k, _)| k).collect();
        assert_eq!(action_keys.len(), ACTION_PERMISSIONS.len());
    }

    #[test]
    fn mapped_routes_resolve_exactly() {
        for (route, permission) in routes() {
            assert_eq!(permission_for_route(route), Some(permission));
        }
        assert_eq!(permission_for_route("/pipes"), Some("leer_tuberias"));
        assert_eq!(permission_for_route("/users/new"), Some("crear_usuarios"));
    }

    #[test]
    fn mapped_actions_resolve_exactly() {
        for (action, permission) in actions() {
            assert_eq!(permission_for_action(action), Some(permission));
        }
        assert_eq!(permission_for_action("create_user"), Some("crear_usuarios"));
    }

    #[test]
    fn unmapped_keys_require_nothing() {
        assert_eq!(permission_for_route("/dashboard"), None);
        assert_eq!(permission_for_route("/settings"), None);
        assert_eq!(permission_for_route(""), None);
        assert_eq!(permission_for_action("launch_rocket"), None);
        // Lookups are exact, not prefix based.
        assert_eq!(permission_for_route("/tanks/42"), None);
    }

    #[test]
    fn routes_and_actions_may_alias_a_permission() {
        assert_eq!(permission_for_route("/map"), permission_for_route("/tanks"));
        assert_eq!(
            permission_for_route("/permissions"),
            permission_for_route("/roles")
        );
        assert_eq!(
            permission_for_action("export_report"),
            permission_for_route("/reports")
        );
    }

    #[test]
    fn path_resolves_longest_segment_prefix() {
        assert_eq!(permission_for_path("/tanks/42/edit"), Some("leer_tanques"));
        assert_eq!(permission_for_path("/tanks/new"), Some("crear_tanques"));
        assert_eq!(permission_for_path("/tanks/new/"), Some("crear_tanques"));
        assert_eq!(
            permission_for_path("/pipes?sector=norte#top"),
            Some("leer_tuberias")
        );
        assert_eq!(permission_for_path("/tanksx"), None);
        assert_eq!(permission_for_path("/"), None);
        assert_eq!(permission_for_path("/dashboard/summary"), None);
    }

    #[test]
    fn required_permissions_are_deduplicated() {
        let perms = required_permissions();
        assert!(perms.contains("leer_tanques"));
        assert!(perms.contains("actualizar_roles"));
        let total = ROUTE_PERMISSIONS.len() + ACTION_PERMISSIONS.len();
        assert!(perms.len() < total);
    }

    #[test]
    fn unmapped_policy_parses_and_defaults_to_allow() {
        assert_eq!(UnmappedPolicy::default(), UnmappedPolicy::Allow);
        assert_eq!("deny".parse::<UnmappedPolicy>().unwrap(), UnmappedPolicy::Deny);
        assert_eq!(" Allow ".parse::<UnmappedPolicy>().unwrap(), UnmappedPolicy::Allow);
        assert!("maybe".parse::<UnmappedPolicy>().is_err());
        assert!(UnmappedPolicy::Allow.allows_unmapped());
        assert!(!UnmappedPolicy::Deny.allows_unmapped());
    }
}
