//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - serve: API server
//! - ask: One-shot questions through the answer pipeline
//! - ingest: Corpus loading into the vector store
//! - info: Information display (health, config)

pub mod ask;
pub mod info;
pub mod ingest;
pub mod serve;

pub use ask::*;
pub use info::*;
pub use ingest::*;
pub use serve::*;
