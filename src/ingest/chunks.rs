//! Content chunk files produced by the documentation scraper

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::Result;
use crate::errors::SupportRagError;
use crate::vector_store::Metadata;

/// Optional metadata copied verbatim when present and non-empty
const PASSTHROUGH_FIELDS: [&str; 4] = ["title", "url", "section", "category"];

/// One entry of a `content_chunks.json` file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentChunk {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub chunk_index: Option<Value>,
}

impl ContentChunk {
    /// Body text: `content`, else `text`; blank bodies count as missing
    pub fn body(&self) -> Option<&str> {
        non_empty(self.content.as_deref()).or_else(|| non_empty(self.text.as_deref()))
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "title" => self.title.as_deref(),
            "url" => self.url.as_deref(),
            "section" => self.section.as_deref(),
            "category" => self.category.as_deref(),
            _ => None,
        };
        non_empty(value)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// A chunk that passed validation, not yet embedded
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDocument {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

impl PendingDocument {
    /// Build the stored form of the chunk at `position`, or `None` if it has no body
    pub fn from_chunk(position: usize, chunk: &ContentChunk) -> Option<Self> {
        let id = format!("chunk_{position}");
        let Some(body) = chunk.body() else {
            warn!("Skipping empty chunk {id}");
            return None;
        };

        let mut metadata = Metadata::new();
        metadata.insert(
            "source".to_string(),
            Value::from(non_empty(chunk.source.as_deref()).unwrap_or("unknown")),
        );
        let topic = non_empty(chunk.topic.as_deref())
            .or_else(|| non_empty(chunk.category.as_deref()))
            .unwrap_or("general");
        metadata.insert("topic".to_string(), Value::from(topic));
        metadata.insert(
            "chunk_index".to_string(),
            chunk
                .chunk_index
                .clone()
                .filter(|v| v.is_number() || v.is_string())
                .unwrap_or_else(|| Value::from(position)),
        );
        for key in PASSTHROUGH_FIELDS {
            if let Some(value) = chunk.field(key) {
                metadata.insert(key.to_string(), Value::from(value));
            }
        }

        Some(Self {
            id,
            document: body.to_string(),
            metadata,
        })
    }
}

/// Parse a JSON array of chunks
pub fn parse_chunks(json: &str) -> Result<Vec<ContentChunk>> {
    serde_json::from_str(json)
        .map_err(|e| SupportRagError::IngestError(format!("invalid chunk file: {e}")))
}

/// Read and parse a chunk file
pub fn load_chunks<P: AsRef<Path>>(path: P) -> Result<Vec<ContentChunk>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        SupportRagError::IngestError(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_chunks(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_prepare() {
        let chunks = parse_chunks(
            r#"[
                {"content": "Mint with the API.", "title": "Minting Guide", "url": "https://docs.crossmint.com/mint", "category": "nft"},
                {"text": "Wallets hold assets.", "source": "wallets.md", "topic": "wallets", "chunk_index": 7},
                {"content": "   "}
            ]"#,
        )
        .unwrap();
        assert_eq!(chunks.len(), 3);

        let first = PendingDocument::from_chunk(0, &chunks[0]).unwrap();
        assert_eq!(first.id, "chunk_0");
        assert_eq!(first.document, "Mint with the API.");
        assert_eq!(first.metadata["source"], "unknown");
        assert_eq!(first.metadata["topic"], "nft");
        assert_eq!(first.metadata["chunk_index"], 0);
        assert_eq!(first.metadata["title"], "Minting Guide");
        assert_eq!(first.metadata["category"], "nft");
        assert!(!first.metadata.contains_key("section"));

        let second = PendingDocument::from_chunk(1, &chunks[1]).unwrap();
        assert_eq!(second.document, "Wallets hold assets.");
        assert_eq!(second.metadata["source"], "wallets.md");
        assert_eq!(second.metadata["topic"], "wallets");
        assert_eq!(second.metadata["chunk_index"], 7);

        assert!(PendingDocument::from_chunk(2, &chunks[2]).is_none());
    }

    #[test]
    fn test_chunk_index_keeps_only_scalars() {
        let chunks = parse_chunks(
            r#"[
                {"content": "a", "chunk_index": "intro-2"},
                {"content": "b", "chunk_index": {"page": 3}},
                {"content": "c", "chunk_index": [1, 2]},
                {"content": "d", "chunk_index": null}
            ]"#,
        )
        .unwrap();

        let indexes: Vec<Value> = chunks
            .iter()
            .enumerate()
            .map(|(pos, chunk)| PendingDocument::from_chunk(pos, chunk).unwrap().metadata["chunk_index"].clone())
            .collect();
        assert_eq!(indexes, vec![Value::from("intro-2"), Value::from(1), Value::from(2), Value::from(3)]);
    }

    #[test]
    fn test_topic_defaults_to_general() {
        let chunk = ContentChunk {
            content: Some("body".to_string()),
            ..Default::default()
        };
        let doc = PendingDocument::from_chunk(3, &chunk).unwrap();
        assert_eq!(doc.metadata["topic"], "general");
    }

    #[test]
    fn test_invalid_file_is_ingest_error() {
        assert!(matches!(
            parse_chunks(r#"{"content": "not an array"}"#),
            Err(SupportRagError::IngestError(_))
        ));
        assert!(load_chunks("/nonexistent/chunks.json").is_err());
    }
}
