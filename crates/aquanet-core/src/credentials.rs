//! Auth token and user identity kept in session storage.
//!
//! The external API client reads the token to authenticate requests; the
//! external login and logout flows write and clear both slots. Values are
//! opaque here: nothing is validated, refreshed or decoded.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::session::{SessionContext, SessionSlot};

/// Storage key of the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the user identity record.
pub const USER_KEY: &str = "user";

/// The tab's bearer token, `None` when signed out.
#[derive(Debug, Clone)]
pub struct CredentialSession {
    slot: SessionSlot<Option<String>>,
}

impl CredentialSession {
    pub fn open(ctx: &SessionContext) -> Self {
        Self {
            slot: ctx.slot(ACCESS_TOKEN_KEY, None),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.slot.get().as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.slot.set(Some(token.into()));
    }

    pub const fn is_authenticated(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Value for an `Authorization` header, if a token is present.
    pub fn bearer_header(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {token}"))
    }

    /// Remove the stored token and forget it. Safe to call when already clear.
    pub fn clear(&mut self) {
        self.slot.reset(None);
    }
}

/// The signed-in user's identity record, `None` when signed out.
///
/// The record is opaque; by default it is kept as raw JSON.
#[derive(Debug, Clone)]
pub struct IdentitySession<U = serde_json::Value> {
    slot: SessionSlot<Option<U>>,
}

impl<U: Serialize + DeserializeOwned> IdentitySession<U> {
    pub fn open(ctx: &SessionContext) -> Self {
        Self {
            slot: ctx.slot(USER_KEY, None),
        }
    }

    pub const fn user(&self) -> Option<&U> {
        self.slot.get().as_ref()
    }

    pub fn set_user(&mut self, user: U) {
        self.slot.set(Some(user));
    }

    /// Remove the stored record and forget it. Safe to call when already clear.
    pub fn clear(&mut self) {
        self.slot.reset(None);
    }
}

/// Token and identity together, as the login and logout flows use them.
#[derive(Debug, Clone)]
pub struct AuthSession<U = serde_json::Value> {
    pub credential: CredentialSession,
    pub identity: IdentitySession<U>,
}

impl<U: Serialize + DeserializeOwned> AuthSession<U> {
    pub fn open(ctx: &SessionContext) -> Self {
        Self {
            credential: CredentialSession::open(ctx),
            identity: IdentitySession::open(ctx),
        }
    }

    /// Store the token and identity returned by a successful login.
    pub fn sign_in(&mut self, token: impl Into<String>, user: U) {
        self.credential.set_token(token);
        self.identity.set_user(user);
        info!("Session signed in");
    }

    /// Clear both slots.
    pub fn sign_out(&mut self) {
        self.credential.clear();
        self.identity.clear();
        info!("Session signed out");
    }

    pub const fn is_authenticated(&self) -> bool {
        self.credential.is_authenticated()
    }
}
