//! Documentation support assistant
//!
//! Answers product questions with retrieval-augmented generation: the
//! question is embedded, the closest documentation snippets are fetched
//! from a vector store and a language model answers grounded in them.
//! When retrieval is unavailable the model answers from general knowledge.

pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod utils;
pub mod vector_store;

#[cfg(test)]
mod errors_tests;

pub use config::AppConfig;
pub use errors::*;
