//! Error type for the edges of the core.
//!
//! Attribution and forecasting themselves never fail: missing signals turn
//! into neutral factors and a degenerate normalization falls back to a unit
//! total. Errors only arise while turning external text into typed input
//! (timestamps, pollutant codes, configuration files).

use thiserror::Error;

/// Errors raised while parsing requests or loading configuration.
#[derive(Debug, Error)]
pub enum AirshedError {
    #[error("invalid timestamp '{0}': expected ISO-8601 such as 2025-11-08T09:00:00")]
    InvalidTimestamp(String),

    #[error("unknown pollutant code '{0}' (expected PM25, PM10, NO2, SO2 or CO)")]
    UnknownPollutant(String),

    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl AirshedError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        AirshedError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = AirshedError> = std::result::Result<T, E>;
