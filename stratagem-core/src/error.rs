//! Error types for the stratagem-core crate.

use thiserror::Error;

/// Top-level error type for training sessions, strategies and models.
#[derive(Debug, Error)]
pub enum TrainError {
    /// The session's model does not expose a capability the strategy needs.
    #[error("Capability mismatch: strategy '{strategy}' requires model '{model}' to support {capability}")]
    CapabilityMismatch {
        strategy: String,
        model: String,
        capability: String,
    },

    /// The model claimed to be resettable but could not reinitialize itself.
    #[error("Reset failed for model '{model}': {reason}")]
    ResetFailed { model: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy '{strategy}' was used before being attached to a session")]
    NotAttached { strategy: String },

    #[error("Strategy '{strategy}' is already attached to a session")]
    AlreadyAttached { strategy: String },

    #[error("Strategy '{strategy}' was invoked with a session it is not attached to")]
    SessionMismatch { strategy: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl TrainError {
    pub fn capability_mismatch(
        strategy: impl Into<String>,
        model: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        Self::CapabilityMismatch {
            strategy: strategy.into(),
            model: model.into(),
            capability: capability.into(),
        }
    }

    pub fn reset_failed(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResetFailed {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}
