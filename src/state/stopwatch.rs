//! Stopwatch
//!
//! Elapsed time is derived from a wall-clock start timestamp. Resuming
//! after a pause back-dates the start by the time already accumulated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    clock::Clock,
    store::{keys, ClockStore, ClockStoreExt},
    utils::format_hh_mm_ss,
};
use super::{
    events::{ClockEvent, ClockStatus, EventBus},
    history::{HistoryEntry, SessionHistory},
};

/// Point-in-time view of the stopwatch for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchSnapshot {
    pub status: ClockStatus,
    pub elapsed_seconds: u64,
    pub start_timestamp: Option<i64>,
    pub display: String,
}

pub struct Stopwatch {
    store: Arc<dyn ClockStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    start_timestamp: Option<i64>,
    accumulated_seconds: u64,
    running: bool,
}

impl Stopwatch {
    pub fn new(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self {
            store,
            clock,
            events,
            start_timestamp: None,
            accumulated_seconds: 0,
            running: false,
        }
    }

    /// Rebuild the stopwatch from the clock store.
    ///
    /// A running flag with a start timestamp resumes running; otherwise the
    /// accumulated time from the last pause becomes the static value.
    pub fn restore(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        let mut stopwatch = Self::new(store, clock, events);
        let running = stopwatch.store.get(keys::SW_RUNNING).as_deref() == Some("true");
        let now = stopwatch.clock.unix_seconds();
        // A start before the epoch or in the future cannot be ours
        let start = stopwatch
            .store
            .get_i64(keys::SW_START)
            .filter(|&start| start > 0 && start <= now);

        match start {
            Some(start) if running => {
                stopwatch.start_timestamp = Some(start);
                stopwatch.running = true;
                info!("Resuming stopwatch at {}", format_hh_mm_ss(stopwatch.elapsed_seconds()));
            }
            _ => {
                stopwatch.accumulated_seconds = stopwatch
                    .store
                    .get_i64(keys::SW_TIME)
                    .and_then(|t| u64::try_from(t).ok())
                    .unwrap_or(0);
            }
        }

        stopwatch
    }

    /// Start or resume. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            debug!("Stopwatch already running");
            return false;
        }

        let accumulated = i64::try_from(self.accumulated_seconds).unwrap_or(i64::MAX);
        let start = self.clock.unix_seconds().saturating_sub(accumulated);
        self.start_timestamp = Some(start);
        self.running = true;
        self.store.put(keys::SW_START, start);
        self.store.put(keys::SW_RUNNING, true);

        info!("Stopwatch started from {}", format_hh_mm_ss(self.accumulated_seconds));
        self.emit_display();
        true
    }

    /// Recompute and publish the elapsed time. Returns `false` when stopped.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.emit_display();
        true
    }

    /// Pause a running stopwatch. Returns `false` if it was not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.accumulated_seconds = self.elapsed_seconds();
        self.start_timestamp = None;
        self.running = false;
        self.store.put(keys::SW_TIME, self.accumulated_seconds);
        self.store.erase(&[keys::SW_START]);
        self.store.put(keys::SW_RUNNING, false);

        info!("Stopwatch paused at {}", format_hh_mm_ss(self.accumulated_seconds));
        self.emit_display();
        true
    }

    /// Stop and zero the stopwatch, first logging any elapsed time as a session
    pub fn reset(&mut self, history: &mut SessionHistory) -> Option<HistoryEntry> {
        let elapsed = self.elapsed_seconds();
        let entry = (elapsed > 0).then(|| history.append(elapsed));

        self.start_timestamp = None;
        self.accumulated_seconds = 0;
        self.running = false;
        self.store.erase(&keys::STOPWATCH_KEYS);

        info!("Stopwatch reset");
        self.emit_display();
        entry
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> ClockStatus {
        if self.running {
            ClockStatus::Running
        } else if self.accumulated_seconds > 0 {
            ClockStatus::Paused
        } else {
            ClockStatus::Idle
        }
    }

    /// Elapsed seconds as of now
    pub fn elapsed_seconds(&self) -> u64 {
        match (self.running, self.start_timestamp) {
            (true, Some(start)) => self.clock.unix_seconds().saturating_sub(start).max(0) as u64,
            _ => self.accumulated_seconds,
        }
    }

    pub fn snapshot(&self) -> StopwatchSnapshot {
        let elapsed = self.elapsed_seconds();
        StopwatchSnapshot {
            status: self.status(),
            elapsed_seconds: elapsed,
            start_timestamp: self.start_timestamp,
            display: format_hh_mm_ss(elapsed),
        }
    }

    pub fn emit_display(&self) {
        let elapsed = self.elapsed_seconds();
        self.events.emit(ClockEvent::StopwatchDisplay {
            display: format_hh_mm_ss(elapsed),
            elapsed_seconds: elapsed,
        });
    }
}
