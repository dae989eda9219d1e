//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `supportrag` CLI

use crate::ingest::IngestStats;
use crate::models::AnswerResult;
use crate::AppConfig;

pub use crate::utils::truncate_str;

/// Hide all but the last four characters of a secret
#[must_use]
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret.map(str::trim).filter(|s| !s.is_empty()) {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 8 => "****".to_string(),
        Some(s) => {
            let tail: String = s.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{tail}")
        }
    }
}

/// Print a pipeline answer
pub fn print_answer(result: &AnswerResult) {
    println!("💬 {}", result.format());
}

/// Print an ingestion summary
pub fn print_ingest_stats(stats: &IngestStats) {
    println!("📊 Ingestion summary:");
    println!("  Chunks read: {}", stats.total_chunks);
    println!("  Documents written: {}", stats.written);
    println!("  Chunks skipped: {}", stats.skipped);
    println!("  Failed batches: {}", stats.failed_batches);
    match stats.final_count {
        Some(count) => println!("  Collection size: {count}"),
        None => println!("  Collection size: unknown"),
    }
}

/// Print current configuration, masking credentials
pub fn print_config(config: &AppConfig) {
    println!("📋 Support Assistant Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Bind address: {}", config.bind_address());
    println!("  CORS: {}", config.server.cors);
    println!("  Request timeout: {}s", config.server.request_timeout_secs);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  API key: {}", mask_secret(config.embeddings.api_key.as_deref()));
    println!();

    println!("🗂️  Vector store:");
    println!("  Endpoint: {}", config.vector_store_endpoint());
    println!("  Collection: {}", config.collection_name());
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  API key: {}", mask_secret(config.llm_key()));
    println!("  Temperature: {}", config.llm.temperature);
    println!(
        "  Max tokens: {} grounded / {} general",
        config.llm.grounded_max_tokens, config.llm.unaided_max_tokens
    );
    println!();

    println!("🔍 Retrieval:");
    println!("  Limit: {} (max {})", config.retrieval.limit, config.retrieval.max_limit);
    println!();

    println!("🏷️  Assistant:");
    println!("  Product: {}", config.assistant.product_name);
    println!("  Docs: {}", config.assistant.docs_url);
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
