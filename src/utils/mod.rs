//! Utility functions module
//! 
//! This module contains utility functions used throughout the application.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_hh_mm_ss, format_mm_ss, parse_hh_mm_ss};
pub use signals::shutdown_signal;
