// Flat key-value persistence: browser localStorage, or memory in tests.

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// `window.localStorage`, resolved on every call so a missing window is just
/// an `Unavailable` error.
#[derive(Default, Debug, Clone, Copy)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let win = web_sys::window().ok_or(StorageError::Unavailable)?;
        win.local_storage()?.ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(Self::storage()?.get_item(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(Self::storage()?.set_item(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Ok(Self::storage()?.remove_item(key)?)
    }
}

#[cfg(test)]
#[derive(Default, Debug)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, reads still work.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend("write rejected".into()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend("write rejected".into()));
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads and decodes `key`. Missing, unreadable or malformed values all come
/// back as `None`; the latter two are logged.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("read of {key} failed: {err}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            warn!("discarding malformed {key}: {}", StorageError::from(err));
            None
        }
    }
}

/// Fire-and-forget write: one attempt, failure logged and dropped.
pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|raw| store.set(key, &raw));
    if let Err(err) = result {
        warn!("write of {key} failed: {err}");
    }
}

pub fn write_raw(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(err) = store.set(key, value) {
        warn!("write of {key} failed: {err}");
    }
}

#[cfg_attr(not(test), allow(dead_code))]
pub fn remove_key(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        warn!("removal of {key} failed: {err}");
    }
}
