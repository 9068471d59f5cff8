//! Session-scoped typed storage.
//!
//! A [`SessionContext`] is handed to every component that needs session
//! state. It wraps the tab's [`StorageMedium`], or nothing at all when the
//! host has no storage, in which case every slot behaves as plain in-memory
//! state.
//!
//! Values are stored as JSON text. Storage and (de)serialization failures are
//! logged and contained here: callers always get a value back and the
//! in-memory state always reflects the last write, even when persisting it
//! failed.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::storage::StorageMedium;

/// Handle to the tab's session storage.
///
/// Cloning is cheap and clones share the same medium.
#[derive(Clone, Default)]
pub struct SessionContext {
    medium: Option<Rc<dyn StorageMedium>>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl SessionContext {
    /// Context backed by `medium`.
    pub fn new(medium: impl StorageMedium + 'static) -> Self {
        Self {
            medium: Some(Rc::new(medium)),
        }
    }

    /// Context for an environment with no storage medium. Nothing persists.
    pub fn detached() -> Self {
        Self { medium: None }
    }

    /// Whether writes can reach a storage medium.
    pub const fn is_attached(&self) -> bool {
        self.medium.is_some()
    }

    /// Read the value stored under `key`, or `initial` when there is none or
    /// it cannot be parsed. `initial` is never written back.
    pub fn read<T: DeserializeOwned>(&self, key: &str, initial: T) -> T {
        self.load(key).unwrap_or(initial)
    }

    /// Whether an entry exists under `key`, parseable or not.
    pub fn contains(&self, key: &str) -> bool {
        let Some(medium) = &self.medium else {
            return false;
        };
        match medium.get(key) {
            Ok(raw) => raw.is_some(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session storage");
                false
            }
        }
    }

    /// Open a typed slot on `key`.
    pub fn slot<T: Serialize + DeserializeOwned>(
        &self,
        key: impl Into<String>,
        initial: T,
    ) -> SessionSlot<T> {
        SessionSlot::open(self, key, initial)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let medium = self.medium.as_ref()?;
        let raw = match medium.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session storage, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed session entry, using default");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) {
        let Some(medium) = &self.medium else {
            return;
        };
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize session value, not persisted");
                return;
            }
        };
        match medium.set(key, &json) {
            Ok(()) => debug!(key, bytes = json.len(), "Persisted session value"),
            Err(e) => warn!(key, error = %e, "Failed to persist session value"),
        }
    }

    fn delete(&self, key: &str) {
        let Some(medium) = &self.medium else {
            return;
        };
        match medium.remove(key) {
            Ok(()) => debug!(key, "Removed session entry"),
            Err(e) => warn!(key, error = %e, "Failed to remove session entry"),
        }
    }
}

/// One typed session value together with its storage key.
///
/// The in-memory copy is authoritative for the lifetime of the slot; the
/// stored copy may lag behind it when persistence fails.
#[derive(Debug, Clone)]
pub struct SessionSlot<T> {
    ctx: SessionContext,
    key: String,
    value: T,
}

impl<T: Serialize + DeserializeOwned> SessionSlot<T> {
    /// Load the slot from storage, falling back to `initial`.
    pub fn open(ctx: &SessionContext, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let value = ctx.read(&key, initial);
        Self {
            ctx: ctx.clone(),
            key,
            value,
        }
    }

    /// Storage key of this slot.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current in-memory value.
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Whether writes to this slot can persist.
    pub const fn is_persistent(&self) -> bool {
        self.ctx.is_attached()
    }

    /// Replace the value and persist it.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.ctx.store(&self.key, &self.value);
    }

    /// Derive the next value from the current one and persist it.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value);
        self.set(next);
    }

    /// Delete the stored entry. The in-memory value is left as is.
    pub fn remove(&self) {
        self.ctx.delete(&self.key);
    }

    /// Delete the stored entry and set the in-memory value to `value`
    /// without persisting it.
    pub fn reset(&mut self, value: T) {
        self.ctx.delete(&self.key);
        self.value = value;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serializer};

    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        sidebar_open: bool,
        sector: String,
    }

    /// Serializes with an error, as a non-string map key would.
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not serializable"))
        }
    }

    /// Medium whose every call fails.
    struct BrokenStorage;

    impl StorageMedium for BrokenStorage {
        fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn set(&self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
        fn remove(&self, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn attached() -> (MemoryStorage, SessionContext) {
        let storage = MemoryStorage::new();
        let ctx = SessionContext::new(storage.clone());
        (storage, ctx)
    }

    #[test]
    fn missing_entry_yields_initial_without_writing_it() {
        let (storage, ctx) = attached();
        let slot = ctx.slot("prefs", 7_u32);
        assert_eq!(*slot.get(), 7);
        assert!(storage.is_empty());
    }

    #[test]
    fn written_values_read_back_equal() {
        let (_storage, ctx) = attached();
        let prefs = Prefs {
            sidebar_open: true,
            sector: "norte".into(),
        };
        let mut slot = ctx.slot::<Option<Prefs>>("prefs", None);
        slot.set(Some(prefs.clone()));

        let reopened = ctx.slot::<Option<Prefs>>("prefs", None);
        assert_eq!(reopened.get(), &Some(prefs));

        let mut nested: BTreeMap<String, Vec<i32>> = BTreeMap::new();
        nested.insert("a".to_string(), vec![1, 2, 3]);
        ctx.slot("nested", BTreeMap::new()).set(nested.clone());
        assert_eq!(ctx.read::<BTreeMap<String, Vec<i32>>>("nested", BTreeMap::new()), nested);
    }

    #[test]
    fn update_uses_previous_value() {
        let (storage, ctx) = attached();
        let mut slot = ctx.slot("visits", 1_u32);
        slot.update(|prev| prev + 1);
        slot.update(|prev| prev * 10);
        assert_eq!(*slot.get(), 20);
        assert_eq!(storage.raw("visits").as_deref(), Some("20"));
    }

    #[test]
    fn malformed_entry_yields_initial_and_stays_until_overwritten() {
        let (storage, ctx) = attached();
        storage.insert_raw("prefs", "{not json");
        let mut slot = ctx.slot("prefs", 3_i32);
        assert_eq!(*slot.get(), 3);
        assert_eq!(storage.raw("prefs").as_deref(), Some("{not json"));

        slot.set(4);
        assert_eq!(storage.raw("prefs").as_deref(), Some("4"));
    }

    #[test]
    fn wrong_shape_is_treated_as_malformed() {
        let (storage, ctx) = attached();
        storage.insert_raw("visits", "\"twelve\"");
        assert_eq!(ctx.read("visits", 0_u32), 0);
    }

    #[test]
    fn quota_failure_still_updates_memory() {
        let storage = MemoryStorage::with_quota(16);
        let ctx = SessionContext::new(storage.clone());
        let mut slot = ctx.slot("note", String::new());
        slot.set("short".into());
        assert_eq!(storage.raw("note").as_deref(), Some("\"short\""));

        slot.set("far too long for the quota".into());
        assert_eq!(slot.get(), "far too long for the quota");
        assert_eq!(storage.raw("note").as_deref(), Some("\"short\""));
    }

    #[test]
    fn serialization_failure_leaves_storage_unchanged() {
        let (storage, ctx) = attached();
        ctx.store("bad", &Unserializable);
        assert_eq!(storage.raw("bad"), None);
    }

    #[test]
    fn remove_only_touches_its_own_slot() {
        let (storage, ctx) = attached();
        let mut a = ctx.slot("a", 0);
        let mut b = ctx.slot("b", 0);
        a.set(1);
        b.set(2);
        a.remove();
        assert!(!ctx.contains("a"));
        assert!(ctx.contains("b"));
        assert_eq!(*a.get(), 1);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn reset_removes_entry_without_persisting_value() {
        let (storage, ctx) = attached();
        let mut slot = ctx.slot::<Option<u8>>("k", None);
        slot.set(Some(9));
        slot.reset(None);
        assert_eq!(slot.get(), &None);
        assert_eq!(storage.raw("k"), None);
    }

    #[test]
    fn detached_context_is_memory_only() {
        let ctx = SessionContext::detached();
        let mut slot = ctx.slot("theme", "light".to_string());
        assert!(!slot.is_persistent());
        slot.set("dark".into());
        slot.remove();
        assert_eq!(slot.get(), "dark");
        assert!(!ctx.contains("theme"));
        assert_eq!(ctx.read("theme", "light".to_string()), "light");
    }

    #[test]
    fn failing_medium_never_panics() {
        let ctx = SessionContext::new(BrokenStorage);
        let mut slot = ctx.slot("k", 1_u8);
        assert_eq!(*slot.get(), 1);
        slot.set(2);
        slot.remove();
        assert_eq!(*slot.get(), 2);
        assert!(!ctx.contains("k"));
    }
}
