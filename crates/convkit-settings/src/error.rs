//! Error types for the settings crate.
//!
//! Everything that can go wrong between reading a job file and handing
//! resolved parameters to the generators.

use convkit_camtools::CamToolError;
use std::io;
use thiserror::Error;

/// Errors that can occur while loading jobs and tool tables.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file extension is not one we know how to read.
    #[error("Unsupported file format: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// An operation names a tool the table does not contain.
    #[error("Tool {0} not found in tool table")]
    ToolNotFound(u32),

    /// A required configuration key is missing.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Dimension text could not be parsed.
    #[error(transparent)]
    Parse(#[from] convkit_core::Error),

    /// Generation rejected the resolved parameters.
    #[error(transparent)]
    CamTool(#[from] CamToolError),
}

impl SettingsError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        assert_eq!(
            SettingsError::ToolNotFound(7).to_string(),
            "Tool 7 not found in tool table"
        );
        assert_eq!(
            SettingsError::MissingKey("operations[0].holes".to_string()).to_string(),
            "Missing configuration key: operations[0].holes"
        );
    }

    #[test]
    fn test_cam_tool_error_is_transparent() {
        let err: SettingsError = CamToolError::Configuration("z_feed is not set".into()).into();
        assert_eq!(err.to_string(), "Configuration error: z_feed is not set");
    }
}
