//! Key-value backends for the persisted slot
//!
//! The comment store never touches `window.localStorage` directly; it is handed
//! a [`KeyValueStore`] so tests and the native binary can swap in memory.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;

/// Synchronous string key-value storage
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`, returning whether it existed
    fn remove(&self, key: &str) -> Result<bool>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot pre-filled
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.slots.borrow_mut().insert(key.to_string(), value.into());
        store
    }

    /// Raw value under `key`, bypassing the `Result` plumbing
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.slots.borrow_mut().remove(key).is_some())
    }
}

/// Browser LocalStorage backend (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open `window.localStorage`, `None` when unavailable (e.g. privacy mode)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.storage.get_item(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Throws QuotaExceededError when the origin is full
        self.storage.set_item(key, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let existed = self.storage.get_item(key)?.is_some();
        self.storage.remove_item(key)?;
        Ok(existed)
    }
}
