//! Layered error definitions
//!
//! Categorized by source: config / source / encode / transport / deadletter

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Change source failed to produce a delivery
    #[error("source '{source_name}' read error: {message}")]
    SourceRead {
        source_name: String,
        message: String,
    },

    // ===== Encoding Errors =====
    /// Record payload could not be serialized for the wire
    #[error("payload encode error for record '{record_id}': {message}")]
    PayloadEncode { record_id: String, message: String },

    // ===== Transport Errors =====
    /// Batch submission to the transport failed
    #[error("transport '{transport}' submit error: {message}")]
    TransportSubmit { transport: String, message: String },

    /// Batch submission exceeded the caller-supplied deadline
    #[error("transport '{transport}' submit timed out after {elapsed_ms}ms")]
    TransportTimeout { transport: String, elapsed_ms: u64 },

    // ===== Dead-letter Errors =====
    /// Dead-letter store rejected or failed to accept unknown records
    #[error("deadletter store '{store}' submit error: {message}")]
    DeadletterSubmit { store: String, message: String },

    // ===== General Errors =====
    /// Invocation was cancelled; in-flight work stopped at a batch boundary
    #[error("invocation cancelled")]
    Cancelled,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source read error
    pub fn source_read(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create payload encode error
    pub fn payload_encode(record_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PayloadEncode {
            record_id: record_id.into(),
            message: message.into(),
        }
    }

    /// Create transport submit error
    pub fn transport_submit(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSubmit {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create dead-letter submit error
    pub fn deadletter_submit(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeadletterSubmit {
            store: store.into(),
            message: message.into(),
        }
    }
}
