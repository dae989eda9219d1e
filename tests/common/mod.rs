//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use supportrag::embeddings::Embedder;
use supportrag::llm::Completer;
use supportrag::llm::SamplingParams;
use supportrag::models::ComposedPrompt;
use supportrag::rag::ResourceBundle;
use supportrag::vector_store::IndexHit;
use supportrag::vector_store::VectorIndex;
use supportrag::Result;
use supportrag::SupportRagError;

#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![text.len() as f32, 0.5, 0.25])
    }

    fn dimension(&self) -> usize {
        3
    }

    fn model(&self) -> &str {
        "fake-embedder"
    }
}

#[derive(Default)]
pub struct FakeIndex {
    pub hits: Vec<IndexHit>,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub requested_k: Mutex<Vec<usize>>,
}

impl FakeIndex {
    pub fn with_hits(hits: Vec<IndexHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requested_k(&self) -> Vec<usize> {
        self.requested_k.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn query(&self, _vector: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested_k.lock().unwrap().push(k);
        if self.fail {
            return Err(SupportRagError::VectorStoreError(
                "connection refused".to_string(),
            ));
        }
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        if self.fail {
            return Err(SupportRagError::VectorStoreError(
                "connection refused".to_string(),
            ));
        }
        Ok(self.hits.len())
    }
}

pub struct FakeCompleter {
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<(ComposedPrompt, SamplingParams)>>,
}

impl FakeCompleter {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers only after `delay` has passed
    pub fn stalling(answer: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering(answer)
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(ComposedPrompt, SamplingParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for FakeCompleter {
    async fn complete(&self, prompt: &ComposedPrompt, params: SamplingParams) -> Result<String> {
        self.calls.lock().unwrap().push((prompt.clone(), params));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply
            .clone()
            .map_err(SupportRagError::LlmError)
    }

    fn model(&self) -> &str {
        "fake-completer"
    }
}

pub fn hit(document: &str, title: &str, url: &str, distance: f32) -> IndexHit {
    IndexHit {
        document: document.to_string(),
        metadata: json!({ "title": title, "url": url })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        distance,
    }
}

/// The two snippets a question about NFTs retrieves
pub fn nft_hits() -> Vec<IndexHit> {
    vec![
        hit(
            "To mint an NFT, create a collection and call the mint endpoint.",
            "Minting Guide",
            "https://docs.crossmint.com/minting",
            0.09,
        ),
        hit(
            "The NFT API accepts a recipient and metadata.",
            "API Reference",
            "https://docs.crossmint.com/api",
            0.23,
        ),
    ]
}

pub struct Fixture {
    pub embedder: Arc<FakeEmbedder>,
    pub index: Option<Arc<FakeIndex>>,
    pub completer: Option<Arc<FakeCompleter>>,
}

impl Fixture {
    pub fn new(index: Option<FakeIndex>, completer: Option<FakeCompleter>) -> Self {
        Self {
            embedder: Arc::new(FakeEmbedder::default()),
            index: index.map(Arc::new),
            completer: completer.map(Arc::new),
        }
    }

    pub fn resources(&self) -> ResourceBundle {
        let mut resources = ResourceBundle::default().with_embedder(self.embedder.clone());
        if let Some(index) = &self.index {
            resources = resources.with_index(index.clone());
        }
        if let Some(completer) = &self.completer {
            resources = resources.with_completer(completer.clone());
        }
        resources
    }

    pub fn embed_calls(&self) -> usize {
        self.embedder.calls.load(Ordering::SeqCst)
    }

    pub fn index_calls(&self) -> usize {
        self.index
            .as_ref()
            .map_or(0, |index| index.calls.load(Ordering::SeqCst))
    }

    pub fn completer_calls(&self) -> Vec<(ComposedPrompt, SamplingParams)> {
        self.completer
            .as_ref()
            .map(|completer| completer.calls())
            .unwrap_or_default()
    }
}
