//! Error types for the walldl library.

use thiserror::Error;

/// Errors that can occur during download and store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Skip-list store could not be read or written.
    #[error("skip-list store error: {0}")]
    SkipList(#[from] csv::Error),

    /// Configuration file is malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for walldl operations.
pub type Result<T> = std::result::Result<T, Error>;
