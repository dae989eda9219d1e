//! Answer pipeline: Retrieve -> Compose -> Complete

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::config::AssistantConfig;
use crate::errors::Result;
use crate::errors::SupportRagError;
use crate::llm::Completer;
use crate::llm::SamplingParams;
use crate::models::AnswerMode;
use crate::models::AnswerResult;
use crate::models::Query;
use crate::models::RetrievedSnippet;
use crate::models::SourceRef;
use crate::rag::ContextAssembler;
use crate::rag::PromptComposer;
use crate::rag::ResourceBundle;
use crate::rag::Retriever;
use crate::rag::SnippetDefaults;

/// Retrieval fan-out and sampling controls
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub retrieval_limit: usize,
    pub max_retrieval_limit: usize,
    pub temperature: f32,
    pub grounded_max_tokens: u32,
    pub unaided_max_tokens: u32,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            retrieval_limit: config.retrieval.limit,
            max_retrieval_limit: config.retrieval.max_limit,
            temperature: config.llm.temperature,
            grounded_max_tokens: config.llm.grounded_max_tokens,
            unaided_max_tokens: config.llm.unaided_max_tokens,
        }
    }

    /// Resolve a caller-supplied result count against the configured bounds
    pub fn resolve_limit(&self, max_results: Option<usize>) -> Result<usize> {
        match max_results {
            None => Ok(self.retrieval_limit),
            Some(0) => Err(SupportRagError::InvalidRequest(
                "max_results must be at least 1".to_string(),
            )),
            Some(n) => Ok(n.min(self.max_retrieval_limit)),
        }
    }

    fn grounded_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_output_tokens: self.grounded_max_tokens,
        }
    }

    fn unaided_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_output_tokens: self.unaided_max_tokens,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retrieval_limit: crate::config::default_retrieval_limit(),
            max_retrieval_limit: crate::config::default_retrieval_max_limit(),
            temperature: crate::config::default_temperature(),
            grounded_max_tokens: crate::config::default_grounded_max_tokens(),
            unaided_max_tokens: crate::config::default_unaided_max_tokens(),
        }
    }
}

/// Which prompt variant a query is answered with
enum Grounding {
    Grounded(Vec<RetrievedSnippet>),
    Unaided,
}

/// Answers support questions, grounded in documentation when possible.
///
/// Holds no per-request state; one instance is shared by all requests.
pub struct AnswerPipeline {
    retriever: Retriever,
    composer: PromptComposer,
    completer: Option<Arc<dyn Completer>>,
    settings: PipelineSettings,
    assistant: AssistantConfig,
}

impl AnswerPipeline {
    /// Create a pipeline from initialized resources and configuration
    #[must_use]
    pub fn new(resources: &ResourceBundle, config: &AppConfig) -> Self {
        Self::with_settings(
            resources,
            PipelineSettings::from_config(config),
            config.assistant.clone(),
        )
    }

    #[must_use]
    pub fn with_settings(
        resources: &ResourceBundle,
        settings: PipelineSettings,
        assistant: AssistantConfig,
    ) -> Self {
        let retriever = Retriever::new(
            resources.embedder.clone(),
            resources.index.clone(),
            SnippetDefaults::from_assistant(&assistant),
        );

        Self {
            retriever,
            composer: PromptComposer::new(assistant.clone()),
            completer: resources.completer.clone(),
            settings,
            assistant,
        }
    }

    /// Answer a raw user question.
    ///
    /// # Errors
    /// - [`SupportRagError::InvalidQuery`] if the question is blank
    /// - [`SupportRagError::InvalidRequest`] if `max_results` is zero
    /// - [`SupportRagError::ServiceUnavailable`] if no completer is configured
    ///
    /// Every other failure is absorbed into the returned [`AnswerResult`].
    pub async fn answer(&self, raw_query: &str, max_results: Option<usize>) -> Result<AnswerResult> {
        let query = Query::parse(raw_query)?;
        let limit = self.settings.resolve_limit(max_results)?;
        let completer = self.completer.as_deref().ok_or_else(|| {
            SupportRagError::ServiceUnavailable("OpenAI API key not configured".to_string())
        })?;

        Ok(self.answer_query(&query, limit, completer).await)
    }

    /// Answer a validated query. Never fails: degradation shows in the mode.
    pub async fn answer_query(
        &self,
        query: &Query,
        limit: usize,
        completer: &dyn Completer,
    ) -> AnswerResult {
        let started = Instant::now();
        info!("Processing query: {}", query);

        debug!("Step 1: Retrieving documentation");
        let snippets = self.retriever.retrieve(query.as_str(), limit).await;
        let grounding = if snippets.is_empty() {
            Grounding::Unaided
        } else {
            Grounding::Grounded(snippets)
        };

        debug!("Step 2: Composing prompt");
        let result = match grounding {
            Grounding::Grounded(snippets) => {
                let prompt = self.composer.grounded(query.as_str(), &snippets);
                let sources = ContextAssembler::sources(&snippets);

                debug!("Step 3: Generating grounded answer from {} snippets", snippets.len());
                match completer
                    .complete(&prompt, self.settings.grounded_params())
                    .await
                {
                    Ok(answer) => answer_result(query, answer, sources, AnswerMode::Rag),
                    Err(e) => {
                        warn!("Grounded completion failed: {e}");
                        let answer = format!(
                            "I encountered an error generating a response: {e}. Please try again."
                        );
                        answer_result(query, answer, sources, AnswerMode::Error)
                    }
                }
            }
            Grounding::Unaided => {
                let prompt = self.composer.unaided(query.as_str());

                debug!("Step 3: Generating answer from general knowledge");
                match completer
                    .complete(&prompt, self.settings.unaided_params())
                    .await
                {
                    Ok(answer) => {
                        let sources = vec![SourceRef::general_knowledge(&self.assistant.docs_url)];
                        answer_result(query, answer, sources, AnswerMode::Fallback)
                    }
                    Err(e) => {
                        warn!("Unaided completion failed: {e}");
                        let answer = format!(
                            "I'm having trouble generating a response right now. Error: {e}. Please try again or check the {} documentation directly.",
                            self.assistant.product_name
                        );
                        answer_result(query, answer, Vec::new(), AnswerMode::Error)
                    }
                }
            }
        };

        info!(
            mode = %result.mode,
            sources = result.sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query answered"
        );

        result
    }
}

fn answer_result(
    query: &Query,
    answer: String,
    sources: Vec<SourceRef>,
    mode: AnswerMode,
) -> AnswerResult {
    AnswerResult {
        query: query.as_str().to_string(),
        answer,
        sources,
        generated_at: Utc::now(),
        mode,
    }
}
