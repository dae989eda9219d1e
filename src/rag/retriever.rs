//! Retrieval: query text -> ranked documentation snippets

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::SupportRagError;
use crate::models::similarity_from_distance;
use crate::models::RetrievedSnippet;
use crate::vector_store::metadata_str;
use crate::vector_store::IndexHit;
use crate::vector_store::VectorIndex;

/// Why retrieval produced nothing usable
#[derive(Debug, Error)]
pub enum RetrievalUnavailable {
    #[error("vector index or embedder not initialized")]
    NotConfigured,

    #[error("embedding failed: {0}")]
    Embedding(SupportRagError),

    #[error("index lookup failed: {0}")]
    Index(SupportRagError),
}

/// Title and URL used when a stored document carries no provenance
#[derive(Debug, Clone)]
pub struct SnippetDefaults {
    pub title: String,
    pub url: String,
}

impl SnippetDefaults {
    pub fn from_assistant(assistant: &crate::config::AssistantConfig) -> Self {
        Self {
            title: format!("{} Documentation", assistant.product_name),
            url: assistant.docs_url.clone(),
        }
    }
}

/// Composes an [`Embedder`] and a [`VectorIndex`] into a snippet search
#[derive(Clone)]
pub struct Retriever {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    defaults: SnippetDefaults,
}

impl Retriever {
    /// Create a new retriever. Either collaborator may be absent.
    pub fn new(
        embedder: Option<Arc<dyn Embedder>>,
        index: Option<Arc<dyn VectorIndex>>,
        defaults: SnippetDefaults,
    ) -> Self {
        Self {
            embedder,
            index,
            defaults,
        }
    }

    /// Semantic search, reporting why retrieval could not run.
    ///
    /// Embeds the query once and issues a single nearest-neighbour request
    /// for `limit` results. Order is the index's order, most similar first.
    pub async fn try_retrieve(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedSnippet>, RetrievalUnavailable> {
        let (Some(embedder), Some(index)) = (&self.embedder, &self.index) else {
            return Err(RetrievalUnavailable::NotConfigured);
        };

        debug!("Performing semantic search: {query}");

        let query_embedding = embedder
            .embed(query)
            .await
            .map_err(RetrievalUnavailable::Embedding)?;

        let hits = index
            .query(&query_embedding, limit.max(1))
            .await
            .map_err(RetrievalUnavailable::Index)?;

        let snippets: Vec<RetrievedSnippet> = hits
            .into_iter()
            .take(limit.max(1))
            .map(|hit| self.to_snippet(hit))
            .collect();

        debug!("Retrieved {} snippets", snippets.len());
        Ok(snippets)
    }

    /// Semantic search that degrades to an empty result.
    ///
    /// Losing retrieval is a valid state: the pipeline answers in fallback
    /// mode instead of failing, so the cause is only logged here.
    pub async fn retrieve(&self, query: &str, limit: usize) -> Vec<RetrievedSnippet> {
        match self.try_retrieve(query, limit).await {
            Ok(snippets) => snippets,
            Err(RetrievalUnavailable::NotConfigured) => {
                debug!("Retrieval not configured, skipping search");
                Vec::new()
            }
            Err(e) => {
                warn!("Retrieval degraded: {e}");
                Vec::new()
            }
        }
    }

    fn to_snippet(&self, hit: IndexHit) -> RetrievedSnippet {
        let title = metadata_str(&hit.metadata, "title")
            .map_or_else(|| self.defaults.title.clone(), str::to_string);
        let url = metadata_str(&hit.metadata, "url")
            .map_or_else(|| self.defaults.url.clone(), str::to_string);

        RetrievedSnippet {
            content: hit.document,
            title,
            url,
            similarity: similarity_from_distance(hit.distance),
        }
    }
}
