//! `AquaNet` Core Library
//!
//! Client-side authorization and session layer of the `AquaNet` water
//! infrastructure console:
//! - Route and action permission catalog
//! - Tab-scoped session storage for the auth token and user identity
//! - Route guard deciding between content, fallback and redirect
//! - Configuration, errors and tracing setup

pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod session;
pub mod storage;
pub mod tracing_init;

pub use catalog::{
    UnmappedPolicy, permission_for_action, permission_for_path, permission_for_route,
};
pub use config::{Config, GuardConfig};
pub use credentials::{AuthSession, CredentialSession, IdentitySession};
pub use error::{Error, Result};
pub use guard::{
    AccessDecision, AccessGuard, GrantedPermissions, Navigator, PermissionCheck, Rendered,
};
pub use session::{SessionContext, SessionSlot};
pub use storage::{MemoryStorage, StorageError, StorageMedium};
