//! Error types for album-sync
//!
//! This module provides the error handling for the library:
//! - A single crate-wide [`Error`] enum with contextual variants
//! - `#[from]` conversions for the underlying I/O, HTTP and JSON errors
//! - A [`Result`] alias used throughout

use thiserror::Error;

/// Result type alias for album-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for album-sync
///
/// Only fatal conditions surface as `Error`. Item-local outcomes (a failed
/// transfer, an expired item) are reported as
/// [`ResultStatus`](crate::types::ResultStatus) values, not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "worker_count")
        key: Option<String>,
    },

    /// Credentials could not be loaded or the token exchange was refused
    #[error("authentication error: {0}")]
    Auth(String),

    /// The remote album could not be located by name
    #[error("album not found: {0}")]
    AlbumNotFound(String),

    /// Two descriptors in one album map to the same local filename
    ///
    /// This is a precondition failure: it aborts the run before any
    /// transfer is dispatched, since two ids must never share a local path.
    #[error("duplicate filename in album: {filename}")]
    DuplicateFilename {
        /// The filename shared by more than one media item
        filename: String,
    },

    /// Ledger persistence failed after a successful transfer was marked
    ///
    /// Fatal by design: the in-memory and on-disk ledgers may now diverge,
    /// and the run stops rather than letting that pass silently.
    #[error("ledger persistence failed: {0}")]
    Ledger(String),

    /// A worker task panicked or was aborted before producing a status
    #[error("worker failed: {0}")]
    Worker(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}
