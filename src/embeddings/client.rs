//! Embedding API clients for various providers

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::errors::SupportRagError;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `OpenAI`-compatible embeddings API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
}

impl EmbeddingProvider {
    /// Parse the provider name used in configuration
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(SupportRagError::ConfigError(format!(
                "Unsupported embeddings provider: {other}"
            ))),
        }
    }
}

/// Client for generating embeddings from various providers
pub struct EmbeddingClient {
    provider: EmbeddingProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(
        provider: EmbeddingProvider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        if provider == EmbeddingProvider::OpenAI && api_key.is_none() {
            return Err(SupportRagError::ConfigError(
                "OpenAI embeddings require an API key".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            provider,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Generate embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            EmbeddingProvider::OpenAI => self
                .generate_batch_openai(vec![text])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    SupportRagError::EmbeddingError("No embedding in response".to_string())
                }),
            EmbeddingProvider::Ollama => self.generate_ollama(text).await,
        }
    }

    /// Generate embeddings for multiple texts in batch, preserving input order
    pub async fn generate_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        match self.provider {
            EmbeddingProvider::OpenAI => self.generate_batch_openai(texts).await,
            EmbeddingProvider::Ollama => {
                // Ollama has no batch endpoint; fan out with bounded concurrency
                use futures::stream::StreamExt;
                use futures::stream::{
                    self,
                };

                let concurrency = texts.len().clamp(1, 16);
                let results: Vec<Result<Vec<f32>>> = stream::iter(
                    texts
                        .into_iter()
                        .map(|text| self.generate_ollama(text))
                        .collect::<Vec<_>>(),
                )
                .buffered(concurrency)
                .collect()
                .await;

                results.into_iter().collect()
            }
        }
    }

    /// Generate embeddings in batch using an `OpenAI`-compatible API
    async fn generate_batch_openai(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| SupportRagError::ConfigError("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct OpenAIBatchRequest<'a> {
            input: Vec<&'a str>,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            #[serde(default)]
            index: Option<usize>,
            embedding: Vec<f32>,
        }

        let expected = texts.len();
        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI embeddings API: {} items", expected);

        let request = OpenAIBatchRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SupportRagError::EmbeddingError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let mut result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| SupportRagError::EmbeddingError(format!("Failed to parse response: {e}")))?;

        // The API documents `index`; order by it when present
        result.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        if result.data.len() != expected {
            return Err(SupportRagError::EmbeddingError(format!(
                "Expected {expected} embeddings, got {}",
                result.data.len()
            )));
        }

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SupportRagError::EmbeddingError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| SupportRagError::EmbeddingError(format!("Failed to parse response: {e}")))?;

        if result.embedding.is_empty() {
            return Err(SupportRagError::EmbeddingError(
                "Ollama returned an empty embedding".to_string(),
            ));
        }

        Ok(result.embedding)
    }
}
