//! Vector store access
//!
//! The retrieval pipeline only sees [`VectorIndex`], a single-query
//! nearest-neighbour contract. Corpus loading goes through [`IndexWriter`].
//! [`chroma`] implements both on top of a Chroma server.

pub mod chroma;

use async_trait::async_trait;
pub use chroma::ChromaClient;
pub use chroma::ChromaCollection;
use serde_json::Map;
use serde_json::Value;

use crate::errors::Result;

/// Free-form metadata stored next to each document
pub type Metadata = Map<String, Value>;

/// One nearest-neighbour result for a single query vector
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub document: String,
    pub metadata: Metadata,
    /// Raw distance as reported by the store; smaller is closer
    pub distance: f32,
}

/// A document ready to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// Read side of the vector store used at query time
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` hits for `vector`, closest first
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize>;
}

/// Write side of the vector store used by corpus ingestion
#[async_trait]
pub trait IndexWriter: Send + Sync {
    /// Insert or replace records by id
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()>;

    /// Number of stored documents
    async fn stored_count(&self) -> Result<usize>;
}

/// Read a string field from metadata, ignoring blanks and non-string values
pub fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
