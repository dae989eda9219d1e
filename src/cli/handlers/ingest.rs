//! Corpus ingestion handler

use std::path::Path;

use tracing::info;

use crate::cli::output::*;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::ingest::ingest_chunks;
use crate::ingest::load_chunks;
use crate::ingest::IngestMode;
use crate::models::similarity_from_distance;
use crate::vector_store::ChromaClient;
use crate::vector_store::ChromaCollection;
use crate::vector_store::VectorIndex;
use crate::AppConfig;
use crate::Result;

/// Question used to check a freshly loaded collection
const SAMPLE_QUESTION: &str = "How do I create an NFT?";

pub async fn handle_ingest(
    config: &AppConfig,
    file: &Path,
    mode: IngestMode,
    batch_size: usize,
) -> Result<()> {
    print_info(&format!("Loading content chunks from {}", file.display()));
    let chunks = load_chunks(file)?;
    print_success(&format!("Loaded {} chunks", chunks.len()));

    let embedder = EmbeddingService::new(config)?;
    let client = ChromaClient::new(config.vector_store_endpoint())?;
    client.heartbeat().await?;

    let collection = open_collection(&client, config, mode).await?;
    info!(
        "Writing to collection '{}' ({} mode)",
        collection.name(),
        mode
    );

    let stats = ingest_chunks(&embedder, &collection, &chunks, batch_size, mode).await?;
    print_ingest_stats(&stats);

    if stats.final_count.unwrap_or(0) > 0 {
        verify_collection(&embedder, &collection).await;
    }

    print_success("Ingestion complete");
    Ok(())
}

async fn open_collection(
    client: &ChromaClient,
    config: &AppConfig,
    mode: IngestMode,
) -> Result<ChromaCollection> {
    let description = format!("{} support documentation", config.assistant.product_name);
    match mode {
        IngestMode::Rebuild => {
            print_warning(&format!(
                "Rebuilding collection '{}': existing documents will be removed",
                config.collection_name()
            ));
            client.recreate(config.collection_name(), &description).await
        }
        IngestMode::Upsert => {
            let info = client
                .get_or_create_collection(config.collection_name(), &description)
                .await?;
            Ok(ChromaCollection::new(client.clone(), info))
        }
    }
}

/// Run one sample query; failures are reported, not fatal
async fn verify_collection(embedder: &dyn Embedder, collection: &ChromaCollection) {
    let hits = match embedder.embed(SAMPLE_QUESTION).await {
        Ok(vector) => collection.query(&vector, 1).await,
        Err(e) => Err(e),
    };

    match hits {
        Ok(hits) => match hits.first() {
            Some(hit) => print_success(&format!(
                "Sample query OK (similarity {:.2}): {}",
                similarity_from_distance(hit.distance),
                truncate_str(&hit.document, 100)
            )),
            None => print_warning("Sample query returned no documents"),
        },
        Err(e) => print_warning(&format!("Sample query failed: {e}")),
    }
}
