//! Error handling for ConvKit core utilities
//!
//! Only the boundary helpers in this crate can fail: turning operator text
//! into numbers and recognising unit names. Everything downstream works on
//! already-parsed values.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Text could not be parsed into a value
    #[error("Cannot parse '{input}': {reason}")]
    Parse {
        /// The text that was rejected.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Unit system name not recognised
    #[error("Unknown measurement system: {0}")]
    UnknownUnits(String),
}

impl Error {
    /// Create a parse error for `input`.
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
