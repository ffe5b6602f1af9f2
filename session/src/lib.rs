//! # Session
//!
//! This crate turns a rapidly edited list of texts into a stable, live
//! cosine similarity matrix, plus the hover highlight state shown next to
//! it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Session event loop                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  InputAction ──► InputList ──► Debouncer ──► EmbeddingPipeline  │
//! │       │              │                            │             │
//! │       ▼              ▼                            ▼             │
//! │  PointerEvent ──► HighlightState          generation guard      │
//! │                                                   │             │
//! │                          SessionView ◄────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use simmatrix_session::{Session, SessionConfig};
//!
//! let config = SessionConfig::default();
//! let handle = Session::spawn(config.clone(), config.model.loader())?;
//!
//! handle.update(0, "The quick brown fox").await?;
//! let view = handle.wait_for(|v| v.matrix.is_some()).await?;
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod highlight;
pub mod inputs;
pub mod pipeline;
pub mod session;

pub use config::{ModelConfig, ModelProviderType, SessionConfig};
pub use debounce::Debouncer;
pub use error::{Result, SessionError};
pub use highlight::{HighlightAction, HighlightState, PointerEvent};
pub use inputs::{InputAction, InputList, InputSnapshot};
pub use pipeline::{EmbeddingPipeline, Generation, ModelStatus, PipelineOutput, PipelineStatus};
pub use session::{Session, SessionHandle, SessionView};

// Re-export from dependencies for convenience
pub use simmatrix_embeddings::{Embedding, EmbeddingModel, ModelLoader, SimilarityMatrix};
