//! API request handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::types::ApiError;
use crate::api::types::BannerResponse;
use crate::api::types::HealthResponse;
use crate::api::types::QueryRequest;
use crate::api::types::QueryResponse;
use crate::rag::AnswerPipeline;
use crate::vector_store::VectorIndex;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnswerPipeline>,
    /// Present only if the index initialized at startup
    pub index: Option<Arc<dyn VectorIndex>>,
    pub product_name: String,
}

/// Service banner
pub async fn root(State(state): State<AppState>) -> Json<BannerResponse> {
    Json(BannerResponse {
        message: format!("{} Support Bot API", state.product_name),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
    })
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let document_count = match &state.index {
        Some(index) => match index.count().await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("Document count unavailable: {e}");
                None
            }
        },
        None => None,
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        rag_available: state.index.is_some(),
        document_count,
    })
}

/// Answer a support question (POST /query)
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected /query body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    let request_id = Uuid::new_v4();
    let span = info_span!("query", %request_id);

    async move {
        info!("POST /query");
        let result = state
            .pipeline
            .answer(&request.query, request.max_results)
            .await?;
        Ok::<_, ApiError>(Json(QueryResponse::from(result)))
    }
    .instrument(span)
    .await
}
