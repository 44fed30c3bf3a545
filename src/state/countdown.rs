//! Countdown timer
//!
//! Remaining time is always derived from a wall-clock end timestamp rather
//! than from counting ticks, so a suspended process or a restart picks up
//! exactly where the clock says it should be.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    error::ClockError,
    store::{keys, ClockStore, ClockStoreExt},
    utils::format_mm_ss,
};
use super::events::{ClockEvent, ClockStatus, EventBus};

/// Result of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down; keep ticking
    Running,
    /// Reached zero on this tick; the expired signal has been emitted
    Expired,
    /// Not running; the tick did nothing
    Idle,
}

/// Point-in-time view of the countdown for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub status: ClockStatus,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub end_timestamp: Option<i64>,
    pub display: String,
}

/// Parse user-entered minutes, accepting only positive integers
pub fn parse_minutes(input: &str) -> Result<i64, ClockError> {
    match input.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ClockError::InvalidDuration(input.to_string())),
    }
}

pub struct CountdownTimer {
    store: Arc<dyn ClockStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    total_seconds: u64,
    remaining_seconds: u64,
    end_timestamp: Option<i64>,
    status: ClockStatus,
}

impl CountdownTimer {
    /// Create an idle countdown with no duration
    pub fn new(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self {
            store,
            clock,
            events,
            total_seconds: 0,
            remaining_seconds: 0,
            end_timestamp: None,
            status: ClockStatus::Idle,
        }
    }

    /// Rebuild the countdown from the clock store.
    ///
    /// A persisted end timestamp still in the future comes back running;
    /// one in the past is discarded without replaying the expiry. A paused
    /// timer comes back paused with its saved remaining time.
    pub fn restore(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        let mut timer = Self::new(store, clock, events);
        let now = timer.clock.unix_seconds();
        let end = timer.store.get_i64(keys::TIMER_END).filter(|&end| end > 0);
        let total = timer.store.get_i64(keys::TIMER_TOTAL).filter(|&total| total > 0);

        match (end, total) {
            (Some(end), Some(total)) if end > now => {
                timer.total_seconds = total as u64;
                timer.remaining_seconds = end.saturating_sub(now) as u64;
                timer.end_timestamp = Some(end);
                timer.status = ClockStatus::Running;
                info!("Resuming countdown with {}s remaining", timer.remaining_seconds);
            }
            (Some(end), Some(_)) => {
                debug!("Discarding countdown that ended {}s ago", now.saturating_sub(end));
                timer.store.erase(&[keys::TIMER_END, keys::TIMER_TOTAL]);
            }
            (None, Some(total)) => {
                timer.total_seconds = total as u64;
                match timer.store.get_i64(keys::TIMER_LEFT).filter(|&left| left > 0) {
                    Some(left) => {
                        timer.remaining_seconds = left as u64;
                        timer.status = ClockStatus::Paused;
                        info!("Restored paused countdown with {}s remaining", left);
                    }
                    None => timer.remaining_seconds = timer.total_seconds,
                }
            }
            _ => {}
        }

        timer
    }

    /// Set a new duration in whole minutes.
    ///
    /// Stops any running countdown and clears its persisted state.
    pub fn set_duration(&mut self, minutes: i64) -> Result<(), ClockError> {
        let total = u64::try_from(minutes)
            .ok()
            .filter(|&m| m > 0)
            .and_then(|m| m.checked_mul(60))
            .filter(|&total| self.end_after(total).is_some())
            .ok_or_else(|| ClockError::InvalidDuration(minutes.to_string()))?;

        self.total_seconds = total;
        self.remaining_seconds = total;
        self.end_timestamp = None;
        self.status = ClockStatus::Idle;
        self.store.erase(&keys::TIMER_KEYS);

        info!("Countdown duration set to {} minutes", minutes);
        self.emit_display();
        Ok(())
    }

    /// Start counting down. Returns `false` if nothing changed.
    pub fn start(&mut self) -> bool {
        if self.status == ClockStatus::Running {
            debug!("Countdown already running");
            return false;
        }
        if self.remaining_seconds == 0 {
            self.remaining_seconds = self.total_seconds;
        }
        if self.remaining_seconds == 0 {
            debug!("Countdown has no duration to run");
            return false;
        }

        let Some(end) = self.end_after(self.remaining_seconds) else {
            warn!("Countdown of {}s ends beyond the representable range", self.remaining_seconds);
            return false;
        };
        self.end_timestamp = Some(end);
        self.status = ClockStatus::Running;
        self.store.put(keys::TIMER_END, end);
        self.store.put(keys::TIMER_TOTAL, self.total_seconds);
        self.store.erase(&[keys::TIMER_LEFT]);

        info!("Countdown started, {}s remaining", self.remaining_seconds);
        self.emit_display();
        true
    }

    /// Recompute remaining time from the end timestamp
    pub fn tick(&mut self) -> TickOutcome {
        let Some(end) = self.end_timestamp else {
            return TickOutcome::Idle;
        };

        let left = end.saturating_sub(self.clock.unix_seconds());
        if left <= 0 {
            self.expire();
            return TickOutcome::Expired;
        }

        self.remaining_seconds = left as u64;
        self.emit_display();
        TickOutcome::Running
    }

    /// Pause a running countdown. Returns `false` if it was not running.
    pub fn pause(&mut self) -> bool {
        let Some(end) = self.end_timestamp else {
            return false;
        };

        let left = end.saturating_sub(self.clock.unix_seconds());
        if left <= 0 {
            self.expire();
            return true;
        }

        self.remaining_seconds = left as u64;
        self.end_timestamp = None;
        self.status = ClockStatus::Paused;
        self.store.erase(&[keys::TIMER_END]);
        self.store.put(keys::TIMER_LEFT, self.remaining_seconds);

        info!("Countdown paused with {}s remaining", self.remaining_seconds);
        self.emit_display();
        true
    }

    /// Stop and rewind to the full duration
    pub fn reset(&mut self) {
        self.end_timestamp = None;
        self.remaining_seconds = self.total_seconds;
        self.status = ClockStatus::Idle;
        self.store.erase(&keys::TIMER_KEYS);

        info!("Countdown reset");
        self.emit_display();
    }

    pub fn is_running(&self) -> bool {
        self.status == ClockStatus::Running
    }

    pub fn status(&self) -> ClockStatus {
        self.status
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    /// Remaining seconds as of now, clamped at zero
    pub fn remaining_seconds(&self) -> u64 {
        match self.end_timestamp {
            Some(end) => end.saturating_sub(self.clock.unix_seconds()).max(0) as u64,
            None => self.remaining_seconds,
        }
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        let remaining = self.remaining_seconds();
        CountdownSnapshot {
            status: self.status,
            total_seconds: self.total_seconds,
            remaining_seconds: remaining,
            end_timestamp: self.end_timestamp,
            display: format_mm_ss(remaining),
        }
    }

    /// Push the current display to subscribers
    pub fn emit_display(&self) {
        let remaining = self.remaining_seconds();
        self.events.emit(ClockEvent::CountdownDisplay {
            display: format_mm_ss(remaining),
            remaining_seconds: remaining,
        });
    }

    /// Unix timestamp `seconds` from now, if it fits
    fn end_after(&self, seconds: u64) -> Option<i64> {
        i64::try_from(seconds)
            .ok()
            .and_then(|seconds| self.clock.unix_seconds().checked_add(seconds))
    }

    fn expire(&mut self) {
        self.end_timestamp = None;
        self.remaining_seconds = 0;
        self.status = ClockStatus::Idle;
        self.store.erase(&keys::TIMER_KEYS);

        warn!("Countdown expired: time's up!");
        self.emit_display();
        self.events.emit(ClockEvent::CountdownExpired);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::*;
    use crate::{clock::ManualClock, store::MemoryStore};

    const T0: i64 = 1_700_000_000;

    fn fixture() -> (CountdownTimer, Arc<MemoryStore>, ManualClock, broadcast::Receiver<ClockEvent>) {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::at(T0);
        let events = EventBus::new();
        let rx = events.subscribe();
        let timer = CountdownTimer::new(store.clone(), Arc::new(clock.clone()), events);
        (timer, store, clock, rx)
    }

    fn drain(rx: &mut broadcast::Receiver<ClockEvent>) -> Vec<ClockEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    fn expired_count(events: &[ClockEvent]) -> usize {
        events.iter().filter(|e| **e == ClockEvent::CountdownExpired).count()
    }

    #[test]
    fn set_duration_fills_remaining() {
        for minutes in [1, 5, 25, 90, 600] {
            let (mut timer, _, _, _) = fixture();
            timer.set_duration(minutes).unwrap();
            assert_eq!(timer.remaining_seconds(), minutes as u64 * 60);
            assert_eq!(timer.total_seconds(), minutes as u64 * 60);
            assert_eq!(timer.status(), ClockStatus::Idle);
        }
    }

    #[test]
    fn invalid_durations_change_nothing() {
        let (mut timer, _, _, mut rx) = fixture();
        timer.set_duration(10).unwrap();
        drain(&mut rx);

        assert!(matches!(timer.set_duration(0), Err(ClockError::InvalidDuration(_))));
        assert!(matches!(timer.set_duration(-3), Err(ClockError::InvalidDuration(_))));
        assert_eq!(timer.total_seconds(), 600);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn huge_durations_are_rejected() {
        let (mut timer, store, _, _) = fixture();
        timer.set_duration(25).unwrap();

        for minutes in [153_722_867_280_912_930, i64::MAX / 60, i64::MAX] {
            assert!(matches!(timer.set_duration(minutes), Err(ClockError::InvalidDuration(_))));
        }
        assert_eq!(timer.total_seconds(), 1500);
        assert!(timer.start());
        assert_eq!(store.get_i64(keys::TIMER_END), Some(T0 + 1500));
    }

    #[test]
    fn extreme_paused_remaining_does_not_start() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::TIMER_TOTAL, "60".to_string()),
            (keys::TIMER_LEFT, i64::MAX.to_string()),
        ]));
        let mut timer = CountdownTimer::restore(store.clone(), Arc::new(ManualClock::at(T0)), EventBus::new());
        assert_eq!(timer.status(), ClockStatus::Paused);
        assert!(!timer.start());
        assert_eq!(store.get(keys::TIMER_END), None);
    }

    #[test]
    fn parse_minutes_accepts_positive_integers_only() {
        assert_eq!(parse_minutes("25").unwrap(), 25);
        assert_eq!(parse_minutes(" 3 ").unwrap(), 3);
        for bad in ["", "abc", "0", "-5", "2.5"] {
            assert!(matches!(parse_minutes(bad), Err(ClockError::InvalidDuration(_))), "{bad}");
        }
    }

    #[test]
    fn start_persists_end_and_total() {
        let (mut timer, store, _, _) = fixture();
        timer.set_duration(25).unwrap();
        assert!(timer.start());

        assert_eq!(store.get_i64(keys::TIMER_END), Some(T0 + 1500));
        assert_eq!(store.get_i64(keys::TIMER_TOTAL), Some(1500));
        assert!(timer.is_running());
    }

    #[test]
    fn start_twice_is_same_as_once() {
        let (mut timer, store, clock, mut rx) = fixture();
        timer.set_duration(1).unwrap();
        assert!(timer.start());
        drain(&mut rx);

        clock.advance(10);
        assert!(!timer.start());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(store.get_i64(keys::TIMER_END), Some(T0 + 60));
        assert_eq!(timer.remaining_seconds(), 50);
    }

    #[test]
    fn start_without_duration_is_noop() {
        let (mut timer, store, _, _) = fixture();
        assert!(!timer.start());
        assert_eq!(timer.status(), ClockStatus::Idle);
        assert_eq!(store.get(keys::TIMER_END), None);
    }

    #[test]
    fn tick_derives_from_wall_clock() {
        let (mut timer, _, clock, mut rx) = fixture();
        timer.set_duration(2).unwrap();
        timer.start();
        drain(&mut rx);

        // A long suspension between ticks is not lost
        clock.advance(75);
        assert_eq!(timer.tick(), TickOutcome::Running);
        assert_eq!(timer.remaining_seconds(), 45);
        assert_eq!(
            drain(&mut rx),
            vec![ClockEvent::CountdownDisplay { display: "00:45".to_string(), remaining_seconds: 45 }]
        );
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let (mut timer, store, clock, mut rx) = fixture();
        timer.set_duration(1).unwrap();
        timer.start();

        let mut outcomes = Vec::new();
        for _ in 0..65 {
            clock.advance(1);
            outcomes.push(timer.tick());
        }

        assert_eq!(outcomes.iter().filter(|o| **o == TickOutcome::Expired).count(), 1);
        assert_eq!(outcomes[59], TickOutcome::Expired);
        assert_eq!(outcomes[60], TickOutcome::Idle);
        assert_eq!(expired_count(&drain(&mut rx)), 1);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.status(), ClockStatus::Idle);
        assert_eq!(store.get(keys::TIMER_END), None);
        assert_eq!(store.get(keys::TIMER_TOTAL), None);
    }

    #[test]
    fn start_after_expiry_refills_from_total() {
        let (mut timer, _, clock, _) = fixture();
        timer.set_duration(1).unwrap();
        timer.start();
        clock.advance(60);
        assert_eq!(timer.tick(), TickOutcome::Expired);

        assert!(timer.start());
        assert_eq!(timer.remaining_seconds(), 60);
    }

    #[test]
    fn pause_keeps_remaining_and_drops_end() {
        let (mut timer, store, clock, _) = fixture();
        timer.set_duration(5).unwrap();
        timer.start();
        clock.advance(100);

        assert!(timer.pause());
        assert_eq!(timer.status(), ClockStatus::Paused);
        assert_eq!(store.get(keys::TIMER_END), None);
        assert_eq!(store.get_i64(keys::TIMER_LEFT), Some(200));

        // Paused time does not drain
        clock.advance(1000);
        assert_eq!(timer.remaining_seconds(), 200);
        assert_eq!(timer.tick(), TickOutcome::Idle);

        assert!(timer.start());
        assert_eq!(store.get_i64(keys::TIMER_END), Some(T0 + 1100 + 200));
        assert_eq!(store.get(keys::TIMER_LEFT), None);
    }

    #[test]
    fn pause_when_idle_is_noop() {
        let (mut timer, _, _, _) = fixture();
        timer.set_duration(5).unwrap();
        assert!(!timer.pause());
        assert_eq!(timer.status(), ClockStatus::Idle);
    }

    #[test]
    fn reset_rewinds_to_total() {
        let (mut timer, store, clock, _) = fixture();
        timer.set_duration(3).unwrap();
        timer.start();
        clock.advance(30);
        timer.tick();

        timer.reset();
        assert_eq!(timer.remaining_seconds(), 180);
        assert_eq!(timer.status(), ClockStatus::Idle);
        for key in keys::TIMER_KEYS {
            assert_eq!(store.get(key), None);
        }
    }

    #[test]
    fn reload_while_running_resumes_with_gap_removed() {
        let (mut timer, store, clock, _) = fixture();
        timer.set_duration(10).unwrap();
        timer.start();
        drop(timer);

        clock.advance(125);
        let resumed = CountdownTimer::restore(store, Arc::new(clock.clone()), EventBus::new());
        assert!(resumed.is_running());
        assert_eq!(resumed.remaining_seconds(), 600 - 125);
        assert_eq!(resumed.total_seconds(), 600);
    }

    #[test]
    fn stale_end_is_discarded_silently() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::TIMER_END, (T0 - 5).to_string()),
            (keys::TIMER_TOTAL, "300".to_string()),
        ]));
        let events = EventBus::new();
        let mut rx = events.subscribe();

        let timer = CountdownTimer::restore(store.clone(), Arc::new(ManualClock::at(T0)), events);
        assert_eq!(timer.status(), ClockStatus::Idle);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(store.get(keys::TIMER_END), None);
        assert_eq!(store.get(keys::TIMER_TOTAL), None);
        assert_eq!(expired_count(&drain(&mut rx)), 0);
    }

    #[test]
    fn paused_timer_restores_paused() {
        let (mut timer, store, clock, _) = fixture();
        timer.set_duration(5).unwrap();
        timer.start();
        clock.advance(60);
        timer.pause();

        clock.advance(3600);
        let restored = CountdownTimer::restore(store, Arc::new(clock.clone()), EventBus::new());
        assert_eq!(restored.status(), ClockStatus::Paused);
        assert_eq!(restored.remaining_seconds(), 240);
        assert_eq!(restored.total_seconds(), 300);
    }

    #[test]
    fn corrupt_values_restore_idle() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::TIMER_END, "soon"),
            (keys::TIMER_TOTAL, "lots"),
        ]));
        let timer = CountdownTimer::restore(store, Arc::new(ManualClock::at(T0)), EventBus::new());
        assert_eq!(timer.snapshot().status, ClockStatus::Idle);
        assert_eq!(timer.snapshot().display, "00:00");
    }

    #[test]
    fn extreme_end_timestamps_restore_idle() {
        for end in [i64::MIN, -9_223_372_036_854_775_807, -1] {
            let store = Arc::new(MemoryStore::with_entries([
                (keys::TIMER_END, end.to_string()),
                (keys::TIMER_TOTAL, "300".to_string()),
            ]));
            let timer = CountdownTimer::restore(store, Arc::new(ManualClock::at(T0)), EventBus::new());
            assert_eq!(timer.status(), ClockStatus::Idle, "{end}");
            assert_eq!(timer.snapshot().remaining_seconds, 0);
        }
    }

    #[test]
    fn far_future_end_resumes_without_overflow() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::TIMER_END, i64::MAX.to_string()),
            (keys::TIMER_TOTAL, "300".to_string()),
        ]));
        let clock = ManualClock::at(T0);
        let mut timer = CountdownTimer::restore(store, Arc::new(clock.clone()), EventBus::new());
        assert!(timer.is_running());
        clock.advance(1);
        assert_eq!(timer.tick(), TickOutcome::Running);
        assert!(timer.pause());
    }

    #[test]
    fn failing_store_keeps_in_memory_state() {
        let clock = ManualClock::at(T0);
        let mut timer = CountdownTimer::new(
            Arc::new(MemoryStore::failing()),
            Arc::new(clock.clone()),
            EventBus::new(),
        );
        timer.set_duration(2).unwrap();
        assert!(timer.start());
        clock.advance(20);
        assert_eq!(timer.tick(), TickOutcome::Running);
        assert_eq!(timer.snapshot().display, "01:40");
    }
}
