//! Error types for the clock model

use thiserror::Error;

/// Errors surfaced to callers of the clock model
#[derive(Debug, Error)]
pub enum ClockError {
    /// Duration input that is non-numeric or not a positive number of minutes
    #[error("Enter a valid number of minutes (got {0:?})")]
    InvalidDuration(String),

    /// Destructive operation attempted without the user's confirmation
    #[error("Clearing the study history requires confirmation")]
    ConfirmationRequired,

    /// A lock around clock state was poisoned by a panicking holder
    #[error("Failed to lock {0} state")]
    StatePoisoned(&'static str),
}
