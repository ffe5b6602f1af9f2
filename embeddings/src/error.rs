//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors raised while acquiring a model handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelLoadError {
    /// Provider is missing required settings (API key, URL).
    #[error("embedding model not configured: {0}")]
    NotConfigured(String),

    /// The model could not be fetched or initialized.
    #[error("failed to load embedding model: {0}")]
    Unavailable(String),
}

/// Errors raised by an embed call.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Two vectors handed to the similarity computer have different lengths.
///
/// This only happens when an embedding source is corrupted, so the
/// panicking entry points treat it as fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("length mismatch: left vector has {left} components, right has {right}")]
pub struct LengthMismatch {
    pub left: usize,
    pub right: usize,
}
