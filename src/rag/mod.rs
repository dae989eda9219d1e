//! Documentation-grounded answering
//!
//! This module turns a support question into an answer:
//! - Semantic retrieval of documentation snippets
//! - Context assembly from retrieved snippets
//! - Prompt composition (grounded or general-knowledge)
//! - LLM-based answer generation with graceful degradation
//!
//! # Examples
//!
//! ```rust,no_run
//! use supportrag::config::AppConfig;
//! use supportrag::rag::AnswerPipeline;
//! use supportrag::rag::ResourceBundle;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let resources = ResourceBundle::from_config(&config).await;
//!     let pipeline = AnswerPipeline::new(&resources, &config);
//!
//!     let result = pipeline.answer("How do I mint an NFT?", None).await?;
//!     println!("{}", result.format());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

use std::sync::Arc;

pub use context::ContextAssembler;
pub use pipeline::AnswerPipeline;
pub use pipeline::PipelineSettings;
pub use prompts::PromptComposer;
pub use retriever::RetrievalUnavailable;
pub use retriever::Retriever;
pub use retriever::SnippetDefaults;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::llm::Completer;
use crate::llm::LlmService;
use crate::vector_store::ChromaCollection;
use crate::vector_store::VectorIndex;

/// Collaborators initialized once at startup.
///
/// Each one may be missing; the pipeline degrades instead of refusing to
/// start. Handles are shared read-only by all requests.
#[derive(Clone, Default)]
pub struct ResourceBundle {
    pub embedder: Option<Arc<dyn Embedder>>,
    pub index: Option<Arc<dyn VectorIndex>>,
    pub completer: Option<Arc<dyn Completer>>,
}

impl ResourceBundle {
    /// Initialize every collaborator, logging the ones that are unavailable
    pub async fn from_config(config: &AppConfig) -> Self {
        let embedder: Option<Arc<dyn Embedder>> = match EmbeddingService::new(config) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("Embedder unavailable, retrieval disabled: {e}");
                None
            }
        };

        let index: Option<Arc<dyn VectorIndex>> = match ChromaCollection::connect(config).await {
            Ok(collection) => {
                info!("Vector index ready: collection '{}'", collection.name());
                Some(Arc::new(collection))
            }
            Err(e) => {
                warn!("Vector index unavailable, answering from general knowledge: {e}");
                None
            }
        };

        let completer: Option<Arc<dyn Completer>> = match LlmService::new(config) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("Completer unavailable, queries will be refused: {e}");
                None
            }
        };

        Self {
            embedder,
            index,
            completer,
        }
    }

    /// Whether the vector index initialized at startup
    pub fn rag_available(&self) -> bool {
        self.index.is_some()
    }

    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_completer(mut self, completer: Arc<dyn Completer>) -> Self {
        self.completer = Some(completer);
        self
    }
}
