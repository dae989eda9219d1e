//! Chroma REST client (v1 API)
//!
//! Targets servers that still serve `/api/v1` (Chroma 0.4 to 0.6).
//!
//! Chroma answers every query in batches, one outer list per query vector.
//! [`ChromaCollection`] always sends exactly one vector and unpacks batch 0,
//! so callers only see the single-query [`VectorIndex`] contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::IndexHit;
use super::IndexRecord;
use super::IndexWriter;
use super::Metadata;
use super::VectorIndex;
use crate::errors::Result;
use crate::errors::SupportRagError;

/// Metadata key Chroma uses for the HNSW distance function
pub const DISTANCE_SPACE_KEY: &str = "hnsw:space";

/// Distance function for collections created by this crate
pub const COSINE_SPACE: &str = "cosine";

/// Collection descriptor returned by Chroma
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl CollectionInfo {
    /// Configured distance function; Chroma defaults to `l2`
    pub fn distance_space(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(DISTANCE_SPACE_KEY))
            .and_then(Value::as_str)
            .unwrap_or("l2")
    }
}

/// Raw query response, one inner list per query vector
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<Option<f32>>>>,
}

impl QueryResponse {
    /// Unpack the results for one query vector.
    ///
    /// Document, metadata and distance are zipped by position against the id
    /// list. A position with no document text, no distance, or no metadata
    /// slot (a shorter parallel list) is dropped rather than returned with
    /// blank fields. A `null` metadata entry is kept as empty metadata.
    pub fn into_hits(self, batch: usize) -> Vec<IndexHit> {
        let Some(ids) = self.ids.get(batch) else {
            return Vec::new();
        };
        let documents = self.documents.and_then(|d| d.into_iter().nth(batch));
        let metadatas = self.metadatas.and_then(|m| m.into_iter().nth(batch));
        let distances = self.distances.and_then(|d| d.into_iter().nth(batch));

        let (Some(documents), Some(metadatas), Some(distances)) = (documents, metadatas, distances)
        else {
            warn!("Chroma response is missing documents, metadatas or distances");
            return Vec::new();
        };

        let mut hits = Vec::with_capacity(ids.len());
        let mut dropped = 0usize;

        for position in 0..ids.len() {
            let document = documents.get(position).cloned().flatten();
            let metadata = metadatas.get(position).cloned();
            let distance = distances.get(position).copied().flatten();

            match (document, metadata, distance) {
                (Some(document), Some(metadata), Some(distance))
                    if !document.trim().is_empty() =>
                {
                    hits.push(IndexHit {
                        document,
                        metadata: metadata.unwrap_or_default(),
                        distance,
                    });
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("Dropped {dropped} incomplete Chroma results");
        }

        hits
    }
}

/// Thin client for a Chroma server
#[derive(Clone)]
pub struct ChromaClient {
    client: Client,
    endpoint: String,
}

impl ChromaClient {
    /// Create a new client against `endpoint` (e.g. `http://localhost:8001`)
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.endpoint, path)
    }

    /// Check the server is reachable
    pub async fn heartbeat(&self) -> Result<()> {
        let response = self.client.get(self.url("/heartbeat")).send().await?;
        check_status(response).await.map(|_| ())
    }

    /// Look up an existing collection by name
    pub async fn get_collection(&self, name: &str) -> Result<CollectionInfo> {
        let response = self
            .client
            .get(self.url(&format!("/collections/{name}")))
            .send()
            .await?;
        let response = check_status(response).await?;
        parse_json(response).await
    }

    /// Create a collection using cosine distance, or return the existing one
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CollectionInfo> {
        let mut metadata = Metadata::new();
        metadata.insert(DISTANCE_SPACE_KEY.to_string(), json!(COSINE_SPACE));
        metadata.insert("description".to_string(), json!(description));

        let body = json!({
            "name": name,
            "metadata": metadata,
            "get_or_create": true,
        });

        let response = self
            .client
            .post(self.url("/collections"))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        parse_json(response).await
    }

    /// Delete a collection. Returns `false` if it did not exist.
    pub async fn delete_collection(&self, name: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.url(&format!("/collections/{name}")))
            .send()
            .await?;

        // Chroma reports a missing collection as 404 or as a 400/500 "does not exist"
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if body.contains("does not exist") {
                return Ok(false);
            }
            return Err(SupportRagError::VectorStoreError(format!(
                "Chroma API error ({status}): {body}"
            )));
        }

        Ok(true)
    }

    /// Open a collection for reading and writing
    pub async fn open(&self, name: &str) -> Result<ChromaCollection> {
        let info = self.get_collection(name).await?;
        Ok(ChromaCollection::new(self.clone(), info))
    }

    /// Drop and recreate a collection, returning the fresh handle
    pub async fn recreate(&self, name: &str, description: &str) -> Result<ChromaCollection> {
        if self.delete_collection(name).await? {
            info!("Removed existing collection: {name}");
        }
        let info = self.get_or_create_collection(name, description).await?;
        info!("Created collection: {name}");
        Ok(ChromaCollection::new(self.clone(), info))
    }
}

/// Handle to one Chroma collection
#[derive(Clone)]
pub struct ChromaCollection {
    client: ChromaClient,
    info: CollectionInfo,
}

impl ChromaCollection {
    pub fn new(client: ChromaClient, info: CollectionInfo) -> Self {
        if info.distance_space() != COSINE_SPACE {
            warn!(
                collection = %info.name,
                space = info.distance_space(),
                "Collection does not use cosine distance; similarity scores will be clamped"
            );
        }
        Self { client, info }
    }

    /// Connect to the configured collection
    pub async fn connect(config: &crate::config::AppConfig) -> Result<Self> {
        let client = ChromaClient::new(config.vector_store_endpoint())?;
        client.open(config.collection_name()).await
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    fn url(&self, action: &str) -> String {
        self.client
            .url(&format!("/collections/{}/{action}", self.info.id))
    }

    async fn write(&self, action: &str, records: &[IndexRecord]) -> Result<()> {
        #[derive(Serialize)]
        struct WriteRequest<'a> {
            ids: Vec<&'a str>,
            embeddings: Vec<&'a [f32]>,
            documents: Vec<&'a str>,
            metadatas: Vec<&'a Metadata>,
        }

        if records.is_empty() {
            return Ok(());
        }

        let request = WriteRequest {
            ids: records.iter().map(|r| r.id.as_str()).collect(),
            embeddings: records.iter().map(|r| r.embedding.as_slice()).collect(),
            documents: records.iter().map(|r| r.document.as_str()).collect(),
            metadatas: records.iter().map(|r| &r.metadata).collect(),
        };

        debug!(
            "Writing {} records to collection {} ({action})",
            records.len(),
            self.info.name
        );

        let response = self
            .client
            .client
            .post(self.url(action))
            .json(&request)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

#[async_trait]
impl VectorIndex for ChromaCollection {
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        let body = json!({
            "query_embeddings": [vector],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"],
        });

        let response = self
            .client
            .client
            .post(self.url("query"))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let parsed: QueryResponse = parse_json(response).await?;

        let hits = parsed.into_hits(0);
        debug!("Chroma returned {} hits for k={k}", hits.len());
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        let response = self.client.client.get(self.url("count")).send().await?;
        let response = check_status(response).await?;
        parse_json(response).await
    }
}

#[async_trait]
impl IndexWriter for ChromaCollection {
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()> {
        self.write("upsert", records).await
    }

    async fn stored_count(&self) -> Result<usize> {
        VectorIndex::count(self).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SupportRagError::VectorStoreError(format!(
        "Chroma API error ({status}): {error_text}"
    )))
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| SupportRagError::VectorStoreError(format!("Failed to parse response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> QueryResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_into_hits_zips_by_position() {
        let response = parse(json!({
            "ids": [["a", "b"]],
            "documents": [["first", "second"]],
            "metadatas": [[{"title": "A"}, {"title": "B"}]],
            "distances": [[0.09, 0.23]]
        }));

        let hits = response.into_hits(0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "first");
        assert_eq!(hits[0].metadata["title"], "A");
        assert!((hits[1].distance - 0.23).abs() < 1e-6);
    }

    #[test]
    fn test_into_hits_selects_requested_batch() {
        let response = parse(json!({
            "ids": [["a"], ["b"]],
            "documents": [["batch zero"], ["batch one"]],
            "metadatas": [[{}], [{}]],
            "distances": [[0.1], [0.2]]
        }));

        let hits = response.into_hits(1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document, "batch one");
    }

    #[test]
    fn test_into_hits_drops_incomplete_results() {
        let response = parse(json!({
            "ids": [["a", "b", "c", "d"]],
            "documents": [["kept", null, "no distance", "short metadata"]],
            "metadatas": [[null, {}, {}]],
            "distances": [[0.1, 0.2, null, 0.4]]
        }));

        let hits = response.into_hits(0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document, "kept");
        assert!(hits[0].metadata.is_empty());
    }

    #[test]
    fn test_into_hits_missing_fields() {
        let response = parse(json!({
            "ids": [["a"]],
            "documents": [["text"]],
            "distances": [[0.1]]
        }));
        assert!(response.into_hits(0).is_empty());

        let empty = parse(json!({}));
        assert!(empty.into_hits(0).is_empty());
    }

    #[test]
    fn test_distance_space_defaults_to_l2() {
        let info: CollectionInfo = serde_json::from_value(json!({
            "id": "123",
            "name": "docs",
            "metadata": null
        }))
        .unwrap();
        assert_eq!(info.distance_space(), "l2");

        let cosine: CollectionInfo = serde_json::from_value(json!({
            "id": "123",
            "name": "docs",
            "metadata": {"hnsw:space": "cosine"}
        }))
        .unwrap();
        assert_eq!(cosine.distance_space(), COSINE_SPACE);
    }

    #[test]
    fn test_urls() {
        let client = ChromaClient::new("http://localhost:8001/").unwrap();
        assert_eq!(
            client.url("/heartbeat"),
            "http://localhost:8001/api/v1/heartbeat"
        );
    }
}
