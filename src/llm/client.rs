//! OpenAI-compatible chat-completions client

use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::Completer;
use super::SamplingParams;
use crate::utils::truncate_str;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::SupportRagError;
use crate::models::ComposedPrompt;

/// Longest slice of an error body kept in error messages
const ERROR_SNIPPET_CHARS: usize = 300;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client holding a credential
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    url_chat: String,
    model: String,
    api_key: String,
}

impl LlmService {
    /// Create a client from configuration.
    ///
    /// Fails with [`SupportRagError::ServiceUnavailable`] when no credential
    /// is configured, so the absence is detected once at startup.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config.llm_key().ok_or_else(|| {
            SupportRagError::ServiceUnavailable(format!(
                "completion API key not configured (set {} or llm.llm_key)",
                crate::config::LLM_API_KEY_ENV
            ))
        })?;

        Self::with_key(
            config.llm_endpoint(),
            config.llm_model(),
            api_key,
            Duration::from_secs(config.llm.timeout_secs),
        )
    }

    /// Create a client for an explicit endpoint and credential
    pub fn with_key(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let url_chat = format!("{}/chat/completions", endpoint.trim_end_matches('/'));

        info!(
            model = %model,
            endpoint = %endpoint,
            timeout_secs = timeout.as_secs(),
            "LLM service initialized"
        );

        Ok(Self {
            client,
            url_chat,
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn build_request<'a>(
        &'a self,
        prompt: &'a ComposedPrompt,
        params: SamplingParams,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system_instruction(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user_instruction(),
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
        }
    }
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let snippet = truncate_str(body.trim(), ERROR_SNIPPET_CHARS);
    match status {
        StatusCode::TOO_MANY_REQUESTS => format!("rate limited by completion service: {snippet}"),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("completion service rejected the API key ({status})")
        }
        _ => format!("completion service returned {status}: {snippet}"),
    }
}

fn extract_answer(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| SupportRagError::LlmError("completion response had no content".to_string()))
}

#[async_trait]
impl Completer for LlmService {
    async fn complete(&self, prompt: &ComposedPrompt, params: SamplingParams) -> Result<String> {
        let started = Instant::now();
        let body = self.build_request(prompt, params);

        debug!(
            model = %self.model,
            system_len = prompt.system_instruction().len(),
            user_len = prompt.user_instruction().len(),
            max_tokens = params.max_output_tokens,
            "POST {}", self.url_chat
        );

        let response = self
            .client
            .post(&self.url_chat)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SupportRagError::LlmError("completion request timed out".to_string())
                } else {
                    SupportRagError::LlmError(format!("completion request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SupportRagError::LlmError(describe_status(status, &error_text)));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            SupportRagError::LlmError(format!("malformed completion response: {e}"))
        })?;
        let answer = extract_answer(parsed)?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            answer_len = answer.len(),
            "Completion finished"
        );

        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
