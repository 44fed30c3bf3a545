//! Session history log
//!
//! Completed stopwatch sessions, newest first. The whole list is written
//! back to the store as one JSON snapshot on every change.

use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    clock::Clock,
    error::ClockError,
    store::{keys, ClockStore, ClockStoreExt},
    utils::format_hh_mm_ss,
};
use super::events::{ClockEvent, EventBus};

/// One completed study session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the session was recorded, e.g. "18 Oct 2026, 2:05 pm"
    pub date: String,
    /// Session length as "HH:MM:SS"
    pub duration: String,
}

/// Medium date with short time, e.g. "18 Oct 2026, 2:05 pm"
// Mirrors the en-IN rendering of dateStyle "medium" + timeStyle "short"
pub fn session_label<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%-d %b %Y, %-I:%M %P").to_string()
}

pub struct SessionHistory {
    store: Arc<dyn ClockStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    /// Load the persisted history; anything unreadable starts empty
    pub fn restore(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        let entries = match store.get(keys::STUDY_HISTORY) {
            Some(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed study history: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        Self {
            store,
            clock,
            events,
            entries,
        }
    }

    /// Record a finished session at the front of the log
    pub fn append(&mut self, duration_seconds: u64) -> HistoryEntry {
        let now = self.clock.now().with_timezone(&Local);
        let entry = HistoryEntry {
            date: session_label(&now),
            duration: format_hh_mm_ss(duration_seconds),
        };

        info!("Recorded study session of {}", entry.duration);
        self.entries.insert(0, entry.clone());
        self.persist();
        entry
    }

    /// Empty the log. Refused unless the user confirmed.
    pub fn clear(&mut self, confirmed: bool) -> Result<(), ClockError> {
        if !confirmed {
            return Err(ClockError::ConfirmationRequired);
        }

        info!("Clearing {} study sessions", self.entries.len());
        self.entries.clear();
        self.store.erase(&[keys::STUDY_HISTORY]);
        self.events.emit(ClockEvent::HistoryChanged { entries: 0 });
        Ok(())
    }

    /// Entries newest first
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(text) => self.store.put(keys::STUDY_HISTORY, text),
            Err(e) => warn!("Failed to serialize study history: {}", e),
        }
        self.events.emit(ClockEvent::HistoryChanged {
            entries: self.entries.len(),
        });
    }
}
