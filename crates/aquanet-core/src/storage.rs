//! Tab-scoped key/value storage medium.
//!
//! Session slots never talk to a concrete store directly: they go through the
//! [`StorageMedium`] trait so a host can plug in whatever per-tab store it
//! has, and tests can plug in [`MemoryStorage`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

/// Failures reported by a storage medium.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Writing the value would exceed the medium's capacity.
    #[error("storage quota exceeded writing {key:?}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// The medium exists but refuses access (e.g. disabled by the host).
    #[error("storage medium unavailable")]
    Unavailable,
}

/// A string-keyed store of UTF-8 text values, scoped to one tab.
pub trait StorageMedium {
    /// Read the raw text stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory medium with per-tab lifetime.
///
/// Clones share the same entries. Once every clone is dropped the entries are
/// gone, the same way a tab's session storage disappears when it is closed.
/// Two independently created stores never see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size (keys plus values, in bytes) the store may hold.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Rc::default(),
            quota: Some(quota),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Raw text stored under `key`, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Store raw text without any quota check. Used to seed fixtures,
    /// including deliberately malformed entries.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageMedium for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
