//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Transport creation error
    #[error("failed to create transport '{name}': {message}")]
    TransportCreation { name: String, message: String },

    /// Dead-letter store creation error
    #[error("failed to create deadletter store '{name}': {message}")]
    DeadletterCreation { name: String, message: String },

    /// Contract-level error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a transport creation error
    pub fn transport_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a dead-letter store creation error
    pub fn deadletter_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeadletterCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
