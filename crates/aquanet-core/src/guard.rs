//! Route guard.
//!
//! [`AccessGuard`] wraps a piece of content behind one backend permission and
//! decides, on every render pass, whether the content is shown, a fallback
//! is shown instead, or the user is sent elsewhere.
//!
//! Whether a permission is held is answered by a [`PermissionCheck`]
//! supplied by the caller. The guard calls it synchronously each time and
//! never caches the answer.
//!
//! Denial without a fallback only redirects. No transient "access denied"
//! content is produced alongside the navigation.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::catalog::{self, UnmappedPolicy};
use crate::config::GuardConfig;

/// Destination used when a guard has no explicit redirect.
pub const DEFAULT_REDIRECT: &str = "/dashboard";

/// Answers whether the current user holds a named permission.
pub trait PermissionCheck {
    fn has_permission(&self, name: &str) -> bool;
}

impl<F> PermissionCheck for F
where
    F: Fn(&str) -> bool,
{
    fn has_permission(&self, name: &str) -> bool {
        self(name)
    }
}

/// A fixed set of granted permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedPermissions {
    names: BTreeSet<String>,
}

impl GrantedPermissions {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for GrantedPermissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl PermissionCheck for GrantedPermissions {
    fn has_permission(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Client-side route replacement.
pub trait Navigator {
    fn replace(&mut self, to: &str);
}

impl<F> Navigator for F
where
    F: FnMut(&str),
{
    fn replace(&mut self, to: &str) {
        self(to);
    }
}

/// Navigator that only records where it was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingNavigator {
    pub history: Vec<String>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&mut self, to: &str) {
        self.history.push(to.to_string());
    }
}

/// What a guard needs before it renders its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A backend permission, checked on every evaluation.
    Permission(String),
    /// Nothing: an unmapped route under [`UnmappedPolicy::Allow`].
    Open,
    /// Never satisfied: an unmapped route under [`UnmappedPolicy::Deny`].
    Closed,
}

impl Requirement {
    fn from_lookup(permission: Option<&str>, policy: UnmappedPolicy) -> Self {
        match permission {
            Some(name) => Self::Permission(name.to_string()),
            None if policy.allows_unmapped() => Self::Open,
            None => Self::Closed,
        }
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the children.
    Granted,
    /// Render the fallback; no navigation.
    DeniedWithFallback,
    /// Navigate to `to`; render nothing.
    DeniedWithRedirect { to: String },
}

/// Result of rendering a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a denied render may carry a fallback or a redirect that has to be shown"]
pub enum Rendered<C> {
    Children(C),
    Fallback(C),
    /// A route replacement to `to` was issued.
    Redirected { to: String },
}

impl<C> Rendered<C> {
    /// The rendered content, if any.
    pub fn into_content(self) -> Option<C> {
        match self {
            Self::Children(content) | Self::Fallback(content) => Some(content),
            Self::Redirected { .. } => None,
        }
    }
}

/// Gate for one subtree.
#[derive(Debug, Clone)]
pub struct AccessGuard<C> {
    requirement: Requirement,
    children: C,
    fallback: Option<C>,
    redirect_to: String,
}

impl<C> AccessGuard<C> {
    /// Guard `children` behind `permission`, redirecting to
    /// [`DEFAULT_REDIRECT`] on denial.
    pub fn new(permission: impl Into<String>, children: C) -> Self {
        Self::with_requirement(Requirement::Permission(permission.into()), children)
    }

    /// Guard `children` with whatever the catalog requires for `route`.
    pub fn for_route(route: &str, children: C, config: &GuardConfig) -> Self {
        let requirement =
            Requirement::from_lookup(catalog::permission_for_route(route), config.unmapped_policy);
        Self::with_requirement(requirement, children).redirect_to(config.redirect_to.clone())
    }

    /// Like [`AccessGuard::for_route`] for a concrete location such as
    /// `/tanks/42`, resolved with [`catalog::permission_for_path`].
    pub fn for_path(path: &str, children: C, config: &GuardConfig) -> Self {
        let requirement =
            Requirement::from_lookup(catalog::permission_for_path(path), config.unmapped_policy);
        Self::with_requirement(requirement, children).redirect_to(config.redirect_to.clone())
    }

    pub fn with_requirement(requirement: Requirement, children: C) -> Self {
        Self {
            requirement,
            children,
            fallback: None,
            redirect_to: DEFAULT_REDIRECT.to_string(),
        }
    }

    /// Render `fallback` instead of redirecting on denial.
    #[must_use]
    pub fn with_fallback(mut self, fallback: C) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Redirect destination used on denial without a fallback.
    #[must_use]
    pub fn redirect_to(mut self, to: impl Into<String>) -> Self {
        self.redirect_to = to.into();
        self
    }

    pub const fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Decide the outcome without rendering or navigating.
    pub fn evaluate<P: PermissionCheck + ?Sized>(&self, check: &P) -> AccessDecision {
        if self.is_granted(check) {
            AccessDecision::Granted
        } else if self.fallback.is_some() {
            AccessDecision::DeniedWithFallback
        } else {
            AccessDecision::DeniedWithRedirect {
                to: self.redirect_to.clone(),
            }
        }
    }

    /// Evaluate and produce the outcome. Navigation happens only on denial
    /// without a fallback, exactly once.
    pub fn render<P, N>(self, check: &P, navigator: &mut N) -> Rendered<C>
    where
        P: PermissionCheck + ?Sized,
        N: Navigator + ?Sized,
    {
        if self.is_granted(check) {
            return Rendered::Children(self.children);
        }
        if let Some(fallback) = self.fallback {
            return Rendered::Fallback(fallback);
        }
        info!(to = %self.redirect_to, "Redirecting after denied access");
        navigator.replace(&self.redirect_to);
        Rendered::Redirected {
            to: self.redirect_to,
        }
    }

    fn is_granted<P: PermissionCheck + ?Sized>(&self, check: &P) -> bool {
        let granted = match &self.requirement {
            Requirement::Permission(name) => check.has_permission(name),
            Requirement::Open => true,
            Requirement::Closed => false,
        };
        match &self.requirement {
            Requirement::Permission(name) if granted => debug!(permission = %name, "Access granted"),
            Requirement::Permission(name) => info!(permission = %name, "Access denied"),
            Requirement::Open => debug!("Access granted, no permission required"),
            Requirement::Closed => info!("Access denied, route has no catalog entry"),
        }
        granted
    }
}
