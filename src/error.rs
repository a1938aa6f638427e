//! Error types for shopchat.

use thiserror::Error;

/// Primary error type for all shopchat operations.
#[derive(Error, Debug)]
pub enum ShopchatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Tool bridge error: {0}")]
    Bridge(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Turn canceled")]
    Canceled,
}

impl ShopchatError {
    /// Stable identifier used when recording this error in telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Model(_) => "model_error",
            Self::Stream(_) => "stream_error",
            Self::Bridge(_) => "bridge_error",
            Self::Serialization(_) => "serialization_error",
            Self::Canceled => "canceled",
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShopchatError>;
