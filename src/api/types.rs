//! API request and response types

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::SupportRagError;
use crate::models::AnswerResult;
use crate::models::SourceRef;

/// Body of `POST /query`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Cited source on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBody {
    pub title: String,
    pub url: String,
    pub relevance_score: f32,
}

impl From<SourceRef> for SourceBody {
    fn from(source: SourceRef) -> Self {
        Self {
            title: source.title,
            url: source.url,
            relevance_score: source.relevance_score,
        }
    }
}

/// Response of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub response: String,
    pub sources: Vec<SourceBody>,
    /// ISO-8601 generation time
    pub timestamp: String,
    /// Answer mode label
    pub method: String,
}

impl From<AnswerResult> for QueryResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            query: result.query,
            response: result.answer,
            sources: result.sources.into_iter().map(SourceBody::from).collect(),
            timestamp: result.generated_at.to_rfc3339(),
            method: result.mode.label().to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rag_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_count: Option<usize>,
}

/// Service banner returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

/// Error body, `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// An error on its way out of a handler
#[derive(Debug)]
pub enum ApiError {
    /// Raised by the answer pipeline
    Pipeline(SupportRagError),
    /// Rejected before reaching the pipeline, status already decided
    Http { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Pipeline(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http { status, .. } => *status,
        }
    }

    /// Response for a request cut off by the timeout layer
    pub fn timeout() -> Self {
        Self::Http {
            status: StatusCode::REQUEST_TIMEOUT,
            detail: "Request timed out".to_string(),
        }
    }

    fn detail(self) -> String {
        match self {
            Self::Pipeline(e) if !e.is_client_error() && !e.is_unavailable() => {
                format!("Error processing query: {e}")
            }
            Self::Pipeline(e) => e.to_string(),
            Self::Http { detail, .. } => detail,
        }
    }
}

impl From<SupportRagError> for ApiError {
    fn from(error: SupportRagError) -> Self {
        Self::Pipeline(error)
    }
}

/// Malformed bodies keep axum's status (400 or 422) but use the `detail` shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Http {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}
