//! Error types for analytics operations.
//!
//! This module defines [`AnalyticsError`]. The numeric routines never fail on
//! short or degenerate input; errors only surface at configuration, interchange
//! and cache boundaries.

use thiserror::Error;

/// Errors that can occur around the analytics engine.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A configuration value is out of range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required DataFrame column is absent.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Error converting to or from a DataFrame.
    #[error("Frame error: {0}")]
    Frame(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Error serializing or deserializing a value.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl AnalyticsError {
    /// Shorthand for [`AnalyticsError::InvalidParameter`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<polars::prelude::PolarsError> for AnalyticsError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::Frame(err.to_string())
    }
}

/// Result type alias using [`AnalyticsError`].
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = AnalyticsError::invalid("trend_window", "must be at least 3");
        assert_eq!(
            err.to_string(),
            "Invalid parameter trend_window: must be at least 3"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: AnalyticsError = err.into();
        assert!(matches!(err, AnalyticsError::Serialization(_)));
    }
}
