//! Events the clock model emits for the presentation layer

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use super::theme::Theme;

/// Capacity of the event channel; slow subscribers skip the oldest events
const EVENT_CAPACITY: usize = 256;

/// Display updates and signals pushed to whoever renders the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockEvent {
    CountdownDisplay { display: String, remaining_seconds: u64 },
    StopwatchDisplay { display: String, elapsed_seconds: u64 },
    /// Fired once when a running countdown reaches zero
    CountdownExpired,
    HistoryChanged { entries: usize },
    ThemeChanged { theme: Theme, name: String },
}

/// Sending half of the clock event channel
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClockEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publish an event; having no subscribers is normal
    pub fn emit(&self, event: ClockEvent) {
        if self.tx.send(event).is_err() {
            trace!("No event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared running state of a countdown or stopwatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStatus {
    Idle,
    Running,
    Paused,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(ClockEvent::CountdownDisplay {
            display: "25:00".to_string(),
            remaining_seconds: 1500,
        })
        .unwrap();
        assert_eq!(json["type"], "countdown_display");
        assert_eq!(json["display"], "25:00");

        let json = serde_json::to_value(ClockEvent::CountdownExpired).unwrap();
        assert_eq!(json["type"], "countdown_expired");
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(ClockEvent::CountdownExpired);

        let mut rx = bus.subscribe();
        bus.emit(ClockEvent::HistoryChanged { entries: 2 });
        assert_eq!(rx.try_recv().unwrap(), ClockEvent::HistoryChanged { entries: 2 });
    }
}
