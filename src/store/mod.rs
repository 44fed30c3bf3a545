//! Clock store module
//! 
//! Persisted string-keyed, string-valued state that survives restarts.
//! Reads never fail: anything missing or malformed is treated as absent.
//! Writes may fail, and callers go through [`ClockStoreExt`] which logs and
//! swallows the failure so in-memory state stays authoritative.

pub mod file;
pub mod keys;
pub mod memory;

use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Failure to write to a clock store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on clock store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize clock store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Clock store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence behind the countdown, stopwatch and history
pub trait ClockStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Lenient helpers layered over any [`ClockStore`]
pub trait ClockStoreExt {
    /// Read an integer value, treating absent or unparsable text as `None`
    fn get_i64(&self, key: &str) -> Option<i64>;

    /// Write a value, logging and discarding any failure
    fn put(&self, key: &str, value: impl ToString);

    /// Remove keys, logging and discarding any failure
    fn erase(&self, keys: &[&str]);
}

impl<S: ClockStore + ?Sized> ClockStoreExt for S {
    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.trim().parse().ok()
    }

    fn put(&self, key: &str, value: impl ToString) {
        if let Err(e) = self.set(key, &value.to_string()) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn erase(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.remove(key) {
                warn!("Failed to remove {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_i64_tolerates_garbage() {
        let store = MemoryStore::new();
        store.put(keys::TIMER_END, 1234);
        store.put(keys::TIMER_TOTAL, "NaN");
        store.put(keys::SW_TIME, " 90 ");

        assert_eq!(store.get_i64(keys::TIMER_END), Some(1234));
        assert_eq!(store.get_i64(keys::TIMER_TOTAL), None);
        assert_eq!(store.get_i64(keys::SW_TIME), Some(90));
        assert_eq!(store.get_i64(keys::SW_START), None);
    }

    #[test]
    fn failed_writes_are_swallowed() {
        let store = MemoryStore::failing();
        store.put(keys::TIMER_END, 1);
        store.erase(&[keys::TIMER_END, keys::TIMER_TOTAL]);
        assert_eq!(store.get(keys::TIMER_END), None);
    }
}
