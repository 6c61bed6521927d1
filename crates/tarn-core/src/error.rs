//! Error types for tarn

use thiserror::Error;

/// Core error type for tarn operations
///
/// `Connection`, `Query`, `Update`, and `PoolExhausted` are the only kinds
/// the pool surface produces at runtime; `Config` covers construction-time
/// validation, with `Io`/`Serialization` as loader plumbing underneath it.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Update error: {0}")]
    Update(String),

    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for tarn operations
pub type Result<T> = std::result::Result<T, DbError>;
