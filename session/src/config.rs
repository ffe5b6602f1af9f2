//! Configuration for an interactive similarity session.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use simmatrix_embeddings::{
    DEFAULT_HASHING_DIMENSION, HashingModelLoader, HttpModelLoader, ModelLoader,
};

use crate::error::{Result, SessionError};

/// Default quiet period before an edited list is embedded.
pub const DEFAULT_DEBOUNCE_MS: u64 = 750;

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period in milliseconds before a list snapshot is embedded.
    pub debounce_ms: u64,

    /// Keep the previous matrix visible while a newer request is in flight.
    pub keep_stale_matrix: bool,

    /// Capacity of the command channel feeding the event loop.
    pub command_buffer: usize,

    /// Inputs the session starts with.
    pub initial_inputs: Vec<String>,

    /// Embedding model configuration.
    pub model: ModelConfig,
}

impl SessionConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set the debounce quiet period.
    pub fn with_debounce(mut self, quiet: Duration) -> Self {
        self.debounce_ms = u64::try_from(quiet.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the initial inputs.
    pub fn with_initial_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the stale-matrix policy.
    pub fn with_keep_stale_matrix(mut self, keep: bool) -> Self {
        self.keep_stale_matrix = keep;
        self
    }

    /// Set the model configuration.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Debounce quiet period as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.command_buffer == 0 {
            return Err(SessionError::Config(
                "command_buffer must be positive".to_string(),
            ));
        }
        if self.model.provider == ModelProviderType::Hashing && self.model.dimension == 0 {
            return Err(SessionError::Config(
                "model.dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            keep_stale_matrix: true,
            command_buffer: 64,
            initial_inputs: default_inputs(),
            model: ModelConfig::default(),
        }
    }
}

fn default_inputs() -> Vec<String> {
    [
        "The quick brown fox jumped over the lazy dog",
        "The fast orange fox lept over the sluggish dog",
        "I love Monday morning meetings",
        "I love Friday afternoon meetings",
        "The Krusty Krab pizza is the best pizza",
        "Costco pizza is the best pizza",
        "Per my previous email...",
        "Did you even read my last email...",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Configuration for the embedding model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Which provider to use.
    pub provider: ModelProviderType,

    /// Base URL of the HTTP embeddings API.
    pub base_url: String,

    /// Model name sent to the HTTP API.
    pub model: String,

    /// Environment variable holding the HTTP API key.
    pub api_key_env: String,

    /// Vector dimension of the hashing model.
    pub dimension: usize,
}

impl ModelConfig {
    /// Build the loader this configuration describes.
    pub fn loader(&self) -> Arc<dyn ModelLoader> {
        match self.provider {
            ModelProviderType::Hashing => Arc::new(HashingModelLoader::new(self.dimension)),
            ModelProviderType::Http => Arc::new(
                HttpModelLoader::new(&self.base_url, &self.model)
                    .with_api_key_env(&self.api_key_env),
            ),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProviderType::Hashing,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            dimension: DEFAULT_HASHING_DIMENSION,
        }
    }
}

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProviderType {
    /// Offline hashing model.
    Hashing,
    /// OpenAI-compatible embeddings API.
    Http,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(750));
        assert!(config.keep_stale_matrix);
        assert_eq!(config.initial_inputs.len(), 8);
        assert_eq!(config.model.provider, ModelProviderType::Hashing);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            debounce_ms = 200
            initial_inputs = ["cat", "dog"]

            [model]
            provider = "http"
            base_url = "http://localhost:8080/v1"
            "#,
        )
        .unwrap();

        assert_eq!(config.debounce_ms, 200);
        assert_eq!(config.initial_inputs, vec!["cat", "dog"]);
        assert_eq!(config.model.provider, ModelProviderType::Http);
        assert_eq!(config.model.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.command_buffer, 64);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SessionConfig::from_toml_str("command_buffer = 0").unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));

        let err = SessionConfig::from_toml_str("[model]\ndimension = 0").unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));

        let err = SessionConfig::from_toml_str("debounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, SessionError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("simmatrix.toml");
        std::fs::write(&path, "keep_stale_matrix = false\n").unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert!(!config.keep_stale_matrix);
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_debounce(Duration::from_millis(20))
            .with_initial_inputs(["a"])
            .with_keep_stale_matrix(false);
        assert_eq!(config.debounce_ms, 20);
        assert_eq!(config.initial_inputs, vec!["a"]);
        assert!(!config.keep_stale_matrix);
    }
}
