//! Wall-clock abstraction
//!
//! Every timestamp the clock model persists is a Unix-seconds value taken
//! from a [`Clock`], so tests can drive time by hand.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// A source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as whole Unix seconds
    fn unix_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock whose time only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Start the clock at the given Unix-seconds timestamp
    pub fn at(unix_seconds: i64) -> Self {
        let start = DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default();
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by whole seconds
    pub fn advance(&self, seconds: i64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += Duration::seconds(seconds);
    }

    pub fn set(&self, unix_seconds: i64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
