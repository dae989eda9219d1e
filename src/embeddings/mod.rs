//! Embeddings generation module
//!
//! This module provides functionality for generating text embeddings using various providers:
//! - Ollama (local models such as `all-minilm`)
//! - OpenAI-compatible endpoints
//!
//! # Examples
//!
//! ```rust,no_run
//! use supportrag::embeddings::{Embedder, EmbeddingService};
//! use supportrag::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod text_preprocessing;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::errors::Result;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 100;

/// Turns text into a fixed-dimension vector.
///
/// Implementations are shared read-only across concurrent queries.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, output order matching input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Model identifier, for logs and health output
    fn model(&self) -> &str;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = EmbeddingProvider::from_name(&config.embeddings.provider)?;

        // OpenAI embeddings reuse the completion credential unless one is set explicitly
        let api_key = match provider {
            EmbeddingProvider::OpenAI => config
                .embeddings
                .api_key
                .clone()
                .or_else(|| config.llm_key().map(str::to_string)),
            EmbeddingProvider::Ollama => None,
        };

        Ok(Self {
            provider,
            model: config.embedding_model().to_string(),
            dimension: config.embedding_dimension(),
            endpoint: config.embeddings.endpoint.clone(),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_embedding_config_defaults_to_ollama() {
        let config = AppConfig::default();
        let embedding_config = EmbeddingConfig::from_app_config(&config).unwrap();

        assert_eq!(embedding_config.provider, EmbeddingProvider::Ollama);
        assert_eq!(embedding_config.dimension, 384);
        assert!(embedding_config.api_key.is_none());
    }

    #[test]
    fn test_openai_embeddings_reuse_llm_key() {
        let mut config = AppConfig::default();
        config.embeddings.provider = "openai".to_string();
        config.llm.llm_key = Some("sk-shared".to_string());

        let embedding_config = EmbeddingConfig::from_app_config(&config).unwrap();
        assert_eq!(embedding_config.api_key.as_deref(), Some("sk-shared"));
    }
}
