//! # Embeddings
//!
//! This crate provides the embedding model collaborators and the pure
//! similarity computation used by the simmatrix session.
//!
//! ## Features
//!
//! - **Model Loading**: Asynchronously acquire an embedding model handle
//! - **Batch Embedding**: Turn a snapshot of strings into one vector per string
//! - **Similarity Matrix**: Exactly symmetric, rounded cosine similarity
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings                                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ModelLoader ──► EmbeddingModel ──► Vec<Embedding>              │
//! │       │                │                  │                     │
//! │       ▼                ▼                  ▼                     │
//! │  Http/Hashing     check_shape      SimilarityMatrix             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod hashing;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, LengthMismatch, ModelLoadError, Result};
pub use hashing::{HashingEmbeddingModel, HashingModelLoader};
pub use provider::{EmbeddingModel, HttpEmbeddingModel, HttpModelLoader, ModelLoader, check_shape};
pub use similarity::{
    SimilarityMatrix, cosine_similarity, round_similarity, try_cosine_similarity,
};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension used by the offline hashing model unless configured otherwise.
pub const DEFAULT_HASHING_DIMENSION: usize = 512;
