//! Embedding model collaborators.
//!
//! A [`ModelLoader`] acquires a model handle once per session; the handle
//! then embeds whole snapshots of the input list in a single batch call.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, ModelLoadError, Result};

/// Asynchronously produces a ready-to-use embedding model.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the model. May take arbitrarily long.
    async fn load(&self) -> std::result::Result<Arc<dyn EmbeddingModel>, ModelLoadError>;
}

/// A loaded embedding model.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Get the name of this model.
    fn name(&self) -> &str;

    /// Embed every text, returning one vector per text in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;
}

/// Reject model output that cannot form a similarity matrix.
///
/// The vector count must match the input count and every vector must
/// share the dimension of the first one.
pub fn check_shape(texts: &[String], vectors: &[Embedding]) -> Result<()> {
    if vectors.len() != texts.len() {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            texts.len(),
            vectors.len()
        )));
    }

    if let Some(first) = vectors.first() {
        let dimension = first.len();
        if let Some((index, bad)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimension)
        {
            return Err(EmbeddingError::InvalidResponse(format!(
                "embedding {index} has dimension {}, expected {dimension}",
                bad.len()
            )));
        }
    }

    Ok(())
}

/// Loader for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct HttpModelLoader {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// Model to request.
    model: String,
}

impl HttpModelLoader {
    /// Create a loader for the given endpoint and model.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Read the API key from an environment variable, if set.
    pub fn with_api_key_env(mut self, var: &str) -> Self {
        if let Ok(key) = std::env::var(var) {
            self.api_key = Some(key);
        }
        self
    }
}

#[async_trait]
impl ModelLoader for HttpModelLoader {
    async fn load(&self) -> std::result::Result<Arc<dyn EmbeddingModel>, ModelLoadError> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            ModelLoadError::NotConfigured(format!("no API key for {}", self.base_url))
        })?;

        if self.base_url.is_empty() {
            return Err(ModelLoadError::NotConfigured(
                "empty base URL".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelLoadError::Unavailable(e.to_string()))?;

        info!("Loaded HTTP embedding model {} at {}", self.model, self.base_url);

        Ok(Arc::new(HttpEmbeddingModel {
            api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            client,
            model: self.model.clone(),
        }))
    }
}

/// Embedding model served over HTTP.
pub struct HttpEmbeddingModel {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    model: String,
}

#[async_trait]
impl EmbeddingModel for HttpEmbeddingModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let body = serde_json::json!({
            "input": texts,
            "model": self.model,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "{status}: {error_text}"
            )));
        }

        let mut result: EmbeddingsResponse = response.json().await?;

        // The API may answer out of order; `index` ties each vector to its input.
        result.data.sort_by_key(|item| item.index);
        let vectors: Vec<Embedding> = result.data.into_iter().map(|item| item.embedding).collect();

        check_shape(texts, &vectors)?;

        info!("Generated {} batch embeddings", vectors.len());

        Ok(vectors)
    }
}

/// OpenAI-compatible response format.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_check_shape_accepts_matching_output() {
        let input = texts(&["a", "b"]);
        assert!(check_shape(&input, &[vec![1.0, 0.0], vec![0.0, 1.0]]).is_ok());
    }

    #[test]
    fn test_check_shape_rejects_wrong_count() {
        let input = texts(&["a", "b"]);
        let err = check_shape(&input, &[vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
    }

    #[test]
    fn test_check_shape_rejects_mixed_dimensions() {
        let input = texts(&["a", "b"]);
        let err = check_shape(&input, &[vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("embedding 1 has dimension 1"));
    }

    #[tokio::test]
    async fn test_load_without_api_key_fails() {
        let loader = HttpModelLoader::new("http://localhost:1", "test-model");
        let err = loader.load().await.err();
        assert!(matches!(err, Some(ModelLoadError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_embed_orders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"embedding": [0.0, 1.0], "index": 1},
                    {"embedding": [1.0, 0.0], "index": 0}
                ],
                "model": "test-model"
            })))
            .mount(&server)
            .await;

        let model = HttpModelLoader::new(server.uri(), "test-model")
            .with_api_key("secret")
            .load()
            .await
            .unwrap();

        assert_eq!(model.name(), "test-model");
        let vectors = model.embed(&texts(&["cat", "dog"])).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let model = HttpModelLoader::new(server.uri(), "test-model")
            .with_api_key("secret")
            .load()
            .await
            .unwrap();

        let err = model.embed(&texts(&["cat"])).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_secs: 7
            }
        ));
    }

    #[tokio::test]
    async fn test_embed_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let model = HttpModelLoader::new(server.uri(), "test-model")
            .with_api_key("secret")
            .load()
            .await
            .unwrap();

        let err = model.embed(&texts(&["cat"])).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::ApiRequest(ref msg) if msg.contains("boom")));
    }
}
