//! Main application state management

use std::{
    ops::ControlFlow,
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::{
    clock::Clock,
    error::ClockError,
    store::ClockStore,
    tasks::{Ticker, TICK_PERIOD},
};
use super::{
    countdown::{parse_minutes, CountdownSnapshot, CountdownTimer, TickOutcome},
    events::{ClockEvent, EventBus},
    history::{HistoryEntry, SessionHistory},
    stopwatch::{Stopwatch, StopwatchSnapshot},
    theme::Theme,
};

/// Lock a piece of clock state, reporting poisoning as a [`ClockError`]
fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> Result<MutexGuard<'a, T>, ClockError> {
    mutex.lock().map_err(|_| ClockError::StatePoisoned(what))
}

/// Owns the countdown, the stopwatch, the session history and their tickers
pub struct AppState {
    countdown: Arc<Mutex<CountdownTimer>>,
    stopwatch: Arc<Mutex<Stopwatch>>,
    history: Mutex<SessionHistory>,
    countdown_ticker: Mutex<Ticker>,
    stopwatch_ticker: Mutex<Ticker>,
    theme: Mutex<Theme>,
    store: Arc<dyn ClockStore>,
    events: EventBus,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Build the clock model from whatever the store holds.
    ///
    /// Tickers for clocks that come back running are not started until
    /// [`AppState::resume_ticking`] is called from inside the runtime.
    pub fn new(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, port: u16, host: String) -> Self {
        let events = EventBus::new();
        let countdown = CountdownTimer::restore(Arc::clone(&store), Arc::clone(&clock), events.clone());
        let stopwatch = Stopwatch::restore(Arc::clone(&store), Arc::clone(&clock), events.clone());
        let history = SessionHistory::restore(Arc::clone(&store), clock, events.clone());
        let theme = Theme::restore(store.as_ref());

        info!(
            "Restored clock state: countdown={:?}, stopwatch={:?}, {} history entries, theme={}",
            countdown.status(),
            stopwatch.status(),
            history.len(),
            theme
        );

        Self {
            countdown: Arc::new(Mutex::new(countdown)),
            stopwatch: Arc::new(Mutex::new(stopwatch)),
            history: Mutex::new(history),
            countdown_ticker: Mutex::new(Ticker::new("countdown")),
            stopwatch_ticker: Mutex::new(Ticker::new("stopwatch")),
            theme: Mutex::new(theme),
            store,
            events,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Start ticking any clock restored in the running state
    pub fn resume_ticking(&self) -> Result<(), ClockError> {
        {
            let countdown = lock(&self.countdown, "countdown")?;
            self.sync_countdown_ticker(&countdown, false)?;
            countdown.emit_display();
        }
        let stopwatch = lock(&self.stopwatch, "stopwatch")?;
        self.sync_stopwatch_ticker(&stopwatch, false)?;
        stopwatch.emit_display();
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.events.subscribe()
    }

    // Countdown

    /// Set the countdown duration from raw user input
    pub fn set_duration_input(&self, input: &str) -> Result<CountdownSnapshot, ClockError> {
        let minutes = parse_minutes(input)?;
        self.set_duration(minutes)
    }

    pub fn set_duration(&self, minutes: i64) -> Result<CountdownSnapshot, ClockError> {
        let mut countdown = lock(&self.countdown, "countdown")?;
        countdown.set_duration(minutes)?;
        self.sync_countdown_ticker(&countdown, false)?;
        self.record_action("timer-set");
        Ok(countdown.snapshot())
    }

    pub fn start_countdown(&self) -> Result<CountdownSnapshot, ClockError> {
        let mut countdown = lock(&self.countdown, "countdown")?;
        let started = countdown.start();
        self.sync_countdown_ticker(&countdown, started)?;
        self.record_action("timer-start");
        Ok(countdown.snapshot())
    }

    pub fn pause_countdown(&self) -> Result<CountdownSnapshot, ClockError> {
        let mut countdown = lock(&self.countdown, "countdown")?;
        countdown.pause();
        self.sync_countdown_ticker(&countdown, false)?;
        self.record_action("timer-pause");
        Ok(countdown.snapshot())
    }

    pub fn reset_countdown(&self) -> Result<CountdownSnapshot, ClockError> {
        let mut countdown = lock(&self.countdown, "countdown")?;
        countdown.reset();
        self.sync_countdown_ticker(&countdown, false)?;
        self.record_action("timer-reset");
        Ok(countdown.snapshot())
    }

    pub fn countdown_snapshot(&self) -> Result<CountdownSnapshot, ClockError> {
        Ok(lock(&self.countdown, "countdown")?.snapshot())
    }

    /// Keep exactly one tick task alive while the countdown runs.
    ///
    /// `restart` replaces the current task even if it looks alive: a task
    /// that just saw the countdown expire has not finished yet but will not
    /// tick again.
    fn sync_countdown_ticker(&self, countdown: &CountdownTimer, restart: bool) -> Result<(), ClockError> {
        let mut ticker = lock(&self.countdown_ticker, "countdown ticker")?;
        if !countdown.is_running() {
            ticker.cancel();
            return Ok(());
        }
        if ticker.is_active() && !restart {
            return Ok(());
        }

        let countdown = Arc::clone(&self.countdown);
        ticker.start(TICK_PERIOD, move || match countdown.lock() {
            Ok(mut countdown) => match countdown.tick() {
                TickOutcome::Running => ControlFlow::Continue(()),
                TickOutcome::Expired => {
                    info!("Countdown finished, stopping ticker");
                    ControlFlow::Break(())
                }
                TickOutcome::Idle => ControlFlow::Break(()),
            },
            Err(e) => {
                error!("Failed to lock countdown state: {}", e);
                ControlFlow::Break(())
            }
        });
        Ok(())
    }

    // Stopwatch

    pub fn start_stopwatch(&self) -> Result<StopwatchSnapshot, ClockError> {
        let mut stopwatch = lock(&self.stopwatch, "stopwatch")?;
        let started = stopwatch.start();
        self.sync_stopwatch_ticker(&stopwatch, started)?;
        self.record_action("stopwatch-start");
        Ok(stopwatch.snapshot())
    }

    pub fn pause_stopwatch(&self) -> Result<StopwatchSnapshot, ClockError> {
        let mut stopwatch = lock(&self.stopwatch, "stopwatch")?;
        stopwatch.pause();
        self.sync_stopwatch_ticker(&stopwatch, false)?;
        self.record_action("stopwatch-pause");
        Ok(stopwatch.snapshot())
    }

    /// Reset the stopwatch, logging the finished session if it had any time
    pub fn reset_stopwatch(&self) -> Result<(StopwatchSnapshot, Option<HistoryEntry>), ClockError> {
        let mut stopwatch = lock(&self.stopwatch, "stopwatch")?;
        let mut history = lock(&self.history, "history")?;
        let entry = stopwatch.reset(&mut history);
        drop(history);

        self.sync_stopwatch_ticker(&stopwatch, false)?;
        self.record_action("stopwatch-reset");
        Ok((stopwatch.snapshot(), entry))
    }

    pub fn stopwatch_snapshot(&self) -> Result<StopwatchSnapshot, ClockError> {
        Ok(lock(&self.stopwatch, "stopwatch")?.snapshot())
    }

    fn sync_stopwatch_ticker(&self, stopwatch: &Stopwatch, restart: bool) -> Result<(), ClockError> {
        let mut ticker = lock(&self.stopwatch_ticker, "stopwatch ticker")?;
        if !stopwatch.is_running() {
            ticker.cancel();
            return Ok(());
        }
        if ticker.is_active() && !restart {
            return Ok(());
        }

        let stopwatch = Arc::clone(&self.stopwatch);
        ticker.start(TICK_PERIOD, move || match stopwatch.lock() {
            Ok(mut stopwatch) => {
                if stopwatch.tick() {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            }
            Err(e) => {
                error!("Failed to lock stopwatch state: {}", e);
                ControlFlow::Break(())
            }
        });
        Ok(())
    }

    // History

    pub fn history(&self) -> Result<Vec<HistoryEntry>, ClockError> {
        Ok(lock(&self.history, "history")?.list().to_vec())
    }

    pub fn clear_history(&self, confirmed: bool) -> Result<(), ClockError> {
        lock(&self.history, "history")?.clear(confirmed)?;
        self.record_action("history-clear");
        Ok(())
    }

    // Theme

    pub fn theme(&self) -> Result<Theme, ClockError> {
        Ok(*lock(&self.theme, "theme")?)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<Theme, ClockError> {
        *lock(&self.theme, "theme")? = theme;
        theme.persist(self.store.as_ref());
        info!("{} activated", theme.display_name());
        self.events.emit(ClockEvent::ThemeChanged {
            theme,
            name: theme.display_name().to_string(),
        });
        self.record_action("theme");
        Ok(theme)
    }

    // Metadata

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;
        
        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn countdown_ticking(&self) -> bool {
        self.countdown_ticker.lock().map(|t| t.is_active()).unwrap_or(false)
    }

    pub fn stopwatch_ticking(&self) -> bool {
        self.stopwatch_ticker.lock().map(|t| t.is_active()).unwrap_or(false)
    }

    #[cfg(test)]
    fn countdown_ticker_starts(&self) -> u64 {
        self.countdown_ticker.lock().map(|t| t.starts()).unwrap_or(0)
    }

    #[cfg(test)]
    fn stopwatch_ticker_starts(&self) -> u64 {
        self.stopwatch_ticker.lock().map(|t| t.starts()).unwrap_or(0)
    }
}
