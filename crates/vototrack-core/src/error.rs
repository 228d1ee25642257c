//! Error types for vototrack-core

use thiserror::Error;

/// Result type alias using vototrack-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vototrack-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing endpoint configuration; never retried automatically
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-level fetch or dispatch failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote returned a non-success status
    #[error("Remote returned HTTP {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Malformed tabular payload; fatal to one fetch cycle only
    #[error("Parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A row failed normalization
    #[error("Validation error: {0}")]
    Validation(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Voter not found in the roster
    #[error("Voter not found: {0}")]
    NotFound(String),
}
