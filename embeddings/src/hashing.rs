//! Offline hashing embedding model.
//!
//! Each lowercase word token is hashed into one of `dimension` buckets
//! with a hash-derived sign. Texts sharing words end up with overlapping
//! vectors, which is enough to exercise the pipeline without a network.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ModelLoadError, Result};
use crate::provider::{EmbeddingModel, ModelLoader};
use crate::{DEFAULT_HASHING_DIMENSION, Embedding};

/// Loader for [`HashingEmbeddingModel`].
#[derive(Debug, Clone, Copy)]
pub struct HashingModelLoader {
    dimension: usize,
}

impl HashingModelLoader {
    /// Create a loader producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashingModelLoader {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMENSION)
    }
}

#[async_trait]
impl ModelLoader for HashingModelLoader {
    async fn load(&self) -> std::result::Result<Arc<dyn EmbeddingModel>, ModelLoadError> {
        Ok(Arc::new(HashingEmbeddingModel::new(self.dimension)?))
    }
}

/// Deterministic bag-of-words embedding.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingModel {
    dimension: usize,
    name: String,
}

impl HashingEmbeddingModel {
    /// Create a model producing vectors of `dimension` components.
    ///
    /// Fails with [`ModelLoadError::NotConfigured`] for a zero dimension.
    pub fn new(dimension: usize) -> std::result::Result<Self, ModelLoadError> {
        if dimension == 0 {
            return Err(ModelLoadError::NotConfigured(
                "hashing dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            name: format!("hashing-{dimension}"),
        })
    }

    /// Embed a single text. The empty string maps to the zero vector.
    pub fn embed_one(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingModel for HashingEmbeddingModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        debug!("Hashing {} texts into {} dimensions", texts.len(), self.dimension);
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
