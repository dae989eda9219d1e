//! Information display handlers (health, config)

use crate::cli::output::*;
use crate::vector_store::ChromaCollection;
use crate::vector_store::VectorIndex;
use crate::AppConfig;
use crate::Result;

pub async fn handle_health_command(config: &AppConfig) -> Result<()> {
    print_info(&format!(
        "Checking collection '{}' at {}",
        config.collection_name(),
        config.vector_store_endpoint()
    ));

    match ChromaCollection::connect(config).await {
        Ok(collection) => {
            print_success("RAG available: yes");
            match collection.count().await {
                Ok(count) => println!("  Documents: {count}"),
                Err(e) => print_warning(&format!("Document count unavailable: {e}")),
            }
        }
        Err(e) => {
            print_warning("RAG available: no (answers will use general knowledge)");
            println!("  Reason: {e}");
        }
    }

    if config.llm_key().is_some() {
        print_success(&format!("Completion model: {}", config.llm_model()));
    } else {
        print_warning("Completion API key not configured; queries will be refused");
    }

    Ok(())
}

pub fn handle_config_command(config: &AppConfig) {
    print_config(config);
}
