//! Background tasks module
//! 
//! This module contains the periodic tasks that drive the clock displays.

pub mod ticker;

// Re-export main types
pub use ticker::{Ticker, TICK_PERIOD};
