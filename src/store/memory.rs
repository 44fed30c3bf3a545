//! In-process clock store

use std::{
    collections::HashMap,
    sync::Mutex,
};

use super::{ClockStore, StoreError};

/// Clock store that lives only as long as the process
///
/// `MemoryStore::failing()` rejects every write, which is how a disabled or
/// full backing store looks to the clock model.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every write
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            reject_writes: true,
        }
    }

    /// Seed the store, bypassing the write-failure switch
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            reject_writes: false,
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl ClockStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("swTime", "42").unwrap();
        assert_eq!(store.get("swTime").as_deref(), Some("42"));
        store.remove("swTime").unwrap();
        assert_eq!(store.get("swTime"), None);
    }

    #[test]
    fn failing_store_rejects_writes() {
        let store = MemoryStore::failing();
        assert!(matches!(store.set("a", "b"), Err(StoreError::Unavailable(_))));
        assert!(store.remove("a").is_err());
    }

    #[test]
    fn seeded_entries_are_readable() {
        let store = MemoryStore::with_entries([("bgTheme", "rain")]);
        assert_eq!(store.get("bgTheme").as_deref(), Some("rain"));
    }
}
