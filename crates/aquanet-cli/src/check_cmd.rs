//! Dry-run the route guard for a location and a set of granted permissions.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use aquanet_core::guard::{RecordingNavigator, Requirement};
use aquanet_core::{AccessGuard, GrantedPermissions, GuardConfig, Rendered};

/// Arguments for `aquanet check`.
#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct CheckArgs {
    /// Location to guard, e.g. "/pipes" or "/tanks/42".
    pub path: String,
    /// Permission held by the simulated user (repeatable).
    #[arg(short, long = "grant")]
    pub grants: Vec<String>,
    /// Render a fallback instead of redirecting on denial.
    #[arg(long)]
    pub fallback: bool,
}

/// Evaluate the guard and print the outcome.
pub fn run(args: CheckArgs, config: &GuardConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let granted: GrantedPermissions = args.grants.into_iter().collect();

    let mut guard = AccessGuard::for_path(&args.path, "page", config);
    if args.fallback {
        guard = guard.with_fallback("fallback");
    }

    match guard.requirement() {
        Requirement::Permission(name) => writeln!(out, "requires: {name}")?,
        Requirement::Open => writeln!(out, "requires: nothing (unmapped, allowed)")?,
        Requirement::Closed => writeln!(out, "requires: unavailable (unmapped, denied)")?,
    }

    let mut navigator = RecordingNavigator::new();
    match guard.render(&granted, &mut navigator) {
        Rendered::Children(_) => writeln!(out, "outcome: render {}", args.path)?,
        Rendered::Fallback(_) => writeln!(out, "outcome: render fallback")?,
        Rendered::Redirected { to } => writeln!(out, "outcome: redirect to {to}")?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aquanet_core::UnmappedPolicy;

    use super::*;

    fn check(path: &str, grants: &[&str], fallback: bool, config: &GuardConfig) -> String {
        let args = CheckArgs {
            path: path.into(),
            grants: grants.iter().map(|g| (*g).to_string()).collect(),
            fallback,
        };
        let mut out = Vec::new();
        run(args, config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn granted_path_renders() {
        let text = check("/pipes", &["leer_tuberias"], false, &GuardConfig::default());
        assert_eq!(text, "requires: leer_tuberias\noutcome: render /pipes\n");
    }

    #[test]
    fn denied_path_redirects_to_dashboard() {
        let text = check("/pipes", &[], false, &GuardConfig::default());
        assert!(text.ends_with("outcome: redirect to /dashboard\n"));
    }

    #[test]
    fn denied_path_with_fallback() {
        let text = check("/users/3", &["leer_tanques"], true, &GuardConfig::default());
        assert_eq!(text, "requires: leer_usuarios\noutcome: render fallback\n");
    }

    #[test]
    fn unmapped_path_under_deny_policy() {
        let config = GuardConfig {
            redirect_to: "/login".into(),
            unmapped_policy: UnmappedPolicy::Deny,
        };
        let text = check("/settings", &[], false, &config);
        assert_eq!(
            text,
            "requires: unavailable (unmapped, denied)\noutcome: redirect to /login\n"
        );
    }
}
