//! Error types for the address book store
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Fetch Errors (the only kinds that reach a refresh caller)
    // -------------------------------------------------------------------------
    #[error("Network error: {message}")]
    Network {
        /// HTTP status, when the remote answered at all
        status: Option<u16>,
        message: String,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Record shape error: {0}")]
    RecordShape(String),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage quota exceeded: needed {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Build a network error from a transport failure message
    pub fn network(message: impl Into<String>) -> Self {
        StoreError::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Whether this error is allowed to cross the refresh boundary
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, StoreError::Network { .. } | StoreError::Schema(_))
    }
}
