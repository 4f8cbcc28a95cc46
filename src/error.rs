//! Error types for the e2e environment

use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Main error type for environment operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Fixture construction or derivation failed
    #[error("fixture error: {0}")]
    Fixture(#[from] karpenter_common::Error),

    /// An environment variable holds a value the environment cannot use
    #[error("invalid configuration {key}: {message}")]
    Config {
        /// The environment variable
        key: String,
        /// Description of what's invalid
        message: String,
    },

    /// Logging could not be initialized
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl Error {
    /// Create a configuration error for the given variable
    pub fn config(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: msg.into(),
        }
    }
}
