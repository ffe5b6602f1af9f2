//! Error types for the interactive session.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur in the session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Edit addressed a position past the end of the input list.
    #[error("index {index} out of range for input list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The session event loop has shut down.
    #[error("session closed")]
    Closed,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML parse error.
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
