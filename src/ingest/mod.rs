//! Offline corpus loader
//!
//! Reads scraped documentation chunks, embeds them in batches and writes
//! them to the vector store. Runs outside the request path and only talks
//! to the [`Embedder`] and [`IndexWriter`] traits.

pub mod chunks;

use std::fmt;
use std::str::FromStr;

pub use chunks::load_chunks;
pub use chunks::parse_chunks;
pub use chunks::ContentChunk;
pub use chunks::PendingDocument;
use tracing::info;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::errors::SupportRagError;
use crate::vector_store::IndexRecord;
use crate::vector_store::IndexWriter;

/// Default number of chunks embedded and written per request
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// How the target collection is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Collection was recreated; any failed batch aborts the run
    #[default]
    Rebuild,
    /// Write by id into the existing collection; failed batches are skipped
    Upsert,
}

impl FromStr for IngestMode {
    type Err = SupportRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rebuild" => Ok(Self::Rebuild),
            "upsert" => Ok(Self::Upsert),
            other => Err(SupportRagError::InvalidRequest(format!(
                "unknown ingest mode '{other}' (expected rebuild or upsert)"
            ))),
        }
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rebuild => f.write_str("rebuild"),
            Self::Upsert => f.write_str("upsert"),
        }
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub total_chunks: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed_batches: usize,
    pub final_count: Option<usize>,
}

/// Embed and store `chunks`, `batch_size` at a time
pub async fn ingest_chunks(
    embedder: &dyn Embedder,
    writer: &dyn IndexWriter,
    chunks: &[ContentChunk],
    batch_size: usize,
    mode: IngestMode,
) -> Result<IngestStats> {
    let batch_size = batch_size.max(1);
    let total_batches = chunks.len().div_ceil(batch_size);
    let mut stats = IngestStats {
        total_chunks: chunks.len(),
        ..Default::default()
    };

    info!(
        "Ingesting {} chunks in {} batches ({mode} mode, embedder {})",
        chunks.len(),
        total_batches,
        embedder.model()
    );

    for (batch_idx, batch) in chunks.chunks(batch_size).enumerate() {
        let offset = batch_idx * batch_size;
        let pending: Vec<PendingDocument> = batch
            .iter()
            .enumerate()
            .filter_map(|(i, chunk)| PendingDocument::from_chunk(offset + i, chunk))
            .collect();
        stats.skipped += batch.len() - pending.len();

        if pending.is_empty() {
            continue;
        }

        info!(
            "Processing batch {}/{} ({} documents)",
            batch_idx + 1,
            total_batches,
            pending.len()
        );

        match write_batch(embedder, writer, pending).await {
            Ok(written) => stats.written += written,
            Err(e) => match mode {
                IngestMode::Rebuild => {
                    return Err(SupportRagError::IngestError(format!(
                        "batch {} failed: {e}",
                        batch_idx + 1
                    )));
                }
                IngestMode::Upsert => {
                    warn!("Batch {} failed, skipping: {}", batch_idx + 1, e);
                    stats.failed_batches += 1;
                }
            },
        }
    }

    stats.final_count = match writer.stored_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Could not read collection count: {e}");
            None
        }
    };

    info!(
        "Ingestion complete: {} written, {} skipped, {} failed batches",
        stats.written, stats.skipped, stats.failed_batches
    );

    Ok(stats)
}

async fn write_batch(
    embedder: &dyn Embedder,
    writer: &dyn IndexWriter,
    pending: Vec<PendingDocument>,
) -> Result<usize> {
    let texts: Vec<String> = pending.iter().map(|doc| doc.document.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    if embeddings.len() != pending.len() {
        return Err(SupportRagError::EmbeddingError(format!(
            "expected {} embeddings, got {}",
            pending.len(),
            embeddings.len()
        )));
    }

    let records: Vec<IndexRecord> = pending
        .into_iter()
        .zip(embeddings)
        .map(|(doc, embedding)| IndexRecord {
            id: doc.id,
            document: doc.document,
            metadata: doc.metadata,
            embedding,
        })
        .collect();

    writer.upsert(&records).await?;
    Ok(records.len())
}
