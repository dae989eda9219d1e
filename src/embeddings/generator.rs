//! Embedding generation service with preprocessing and batch processing

use async_trait::async_trait;
use tracing::info;

use super::client::EmbeddingClient;
use super::EmbeddingConfig;
use super::Embedder;
use super::MAX_BATCH_SIZE;
use crate::embeddings::preprocess_text_for_embedding;
use crate::errors::Result;
use crate::errors::SupportRagError;

/// Service for generating embeddings through a configured provider
pub struct EmbeddingService {
    client: EmbeddingClient,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config)?)
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        info!(
            provider = ?config.provider,
            model = %config.model,
            dimension = config.dimension,
            "Embedding service initialized"
        );

        Ok(Self { client, config })
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() == self.config.dimension {
            Ok(())
        } else {
            Err(SupportRagError::EmbeddingError(format!(
                "Expected {}-dimensional embedding from {}, got {}",
                self.config.dimension,
                self.config.model,
                embedding.len()
            )))
        }
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let processed_text = preprocess_text_for_embedding(text)?;
        let embedding = self.client.generate(&processed_text).await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let processed_texts = texts
            .iter()
            .map(|text| preprocess_text_for_embedding(text))
            .collect::<Result<Vec<String>>>()?;

        let mut embeddings = Vec::with_capacity(processed_texts.len());
        for chunk in processed_texts.chunks(MAX_BATCH_SIZE) {
            let chunk_embeddings = self
                .client
                .generate_batch(chunk.iter().map(String::as_str).collect())
                .await?;
            embeddings.extend(chunk_embeddings);
        }

        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
