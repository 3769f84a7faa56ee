//! Error types for Chainr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Chainr
#[derive(Debug, Error)]
pub enum ChainError {
    /// Malformed chain expression
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid chain configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Agent executor reported a transport-level failure
    #[error("Executor error: {0}")]
    Executor(String),

    /// Completion probe failed to evaluate
    #[error("Completion check error: {0}")]
    Completion(String),

    /// Task store error
    #[error("Task store error: {0}")]
    Store(String),

    /// Chain wall-clock deadline exceeded
    #[error("Chain deadline exceeded")]
    DeadlineExceeded,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Chainr operations
pub type Result<T> = std::result::Result<T, ChainError>;
