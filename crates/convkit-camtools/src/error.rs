//! Error types for the CAM tools crate.
//!
//! Every generator checks its parameters before it builds the first line,
//! so an error always means no G-code was produced for that operation.

use std::io;
use thiserror::Error;

/// Errors that can occur during toolpath and cycle generation.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// A parameter value is zero, negative, non-finite or inconsistent.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The tool cannot fit inside the feature being cut.
    #[error("Tool diameter {tool_diameter} exceeds {feature} diameter {feature_diameter}")]
    ToolTooLarge {
        tool_diameter: f64,
        feature: String,
        feature_diameter: f64,
    },

    /// A required setting was never provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error while writing a finished program.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl CamToolError {
    /// Shorthand for [`CamToolError::InvalidParameter`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> CamToolResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CamToolError::invalid(
            name,
            format!("must be greater than 0, got {value}"),
        ))
    }
}

/// Fails unless `value` is finite and not negative.
pub(crate) fn require_non_negative(name: &str, value: f64) -> CamToolResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CamToolError::invalid(
            name,
            format!("must not be negative, got {value}"),
        ))
    }
}

/// Fails unless `value` is finite.
pub(crate) fn require_finite(name: &str, value: f64) -> CamToolResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CamToolError::invalid(name, "must be a finite number"))
    }
}
