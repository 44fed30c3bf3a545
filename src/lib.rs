//! Study Clock - a persistent countdown timer and stopwatch
//! 
//! This library provides the clock model (countdown timer, stopwatch and
//! session history) together with the key-value store it persists to and
//! an HTTP adapter that exposes it to a presentation layer.

pub mod config;
pub mod clock;
pub mod error;
pub mod store;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ClockError;
pub use store::{ClockStore, FileStore, MemoryStore};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
