//! State management module
//! 
//! This module contains the clock model: the countdown timer, the stopwatch,
//! the session history log, the theme preference and the application state
//! that ties them together.

pub mod app_state;
pub mod countdown;
pub mod events;
pub mod history;
pub mod stopwatch;
pub mod theme;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{CountdownSnapshot, CountdownTimer, TickOutcome};
pub use events::{ClockEvent, ClockStatus, EventBus};
pub use history::{HistoryEntry, SessionHistory};
pub use stopwatch::{Stopwatch, StopwatchSnapshot};
pub use theme::Theme;
