//! HTTP server implementation

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::types::ApiError;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::AnswerPipeline;
use crate::rag::ResourceBundle;
use crate::Result;

/// Build shared state from initialized resources
pub fn build_state(resources: &ResourceBundle, config: &AppConfig) -> AppState {
    AppState {
        pipeline: Arc::new(AnswerPipeline::new(resources, config)),
        index: resources.index.clone(),
        product_name: config.assistant.product_name.clone(),
    }
}

/// Wrap the routes in the middleware stack
pub fn build_app(state: AppState, enable_cors: bool, request_timeout: Duration) -> Router {
    let mut app = routes::api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::map_response(detail_on_timeout));

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting support API server...");

    let resources = ResourceBundle::from_config(config).await;
    log_startup_state(&resources).await;

    let state = build_state(&resources, config);
    let app = build_app(
        state,
        enable_cors,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /        - Service banner");
    info!("  GET  /health  - Health check");
    info!("  POST /query   - Ask a support question");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 API server stopped");
    Ok(())
}

/// The timeout layer answers with an empty 408; give it a `detail` body
async fn detail_on_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        warn!("Request exceeded the configured timeout");
        return ApiError::timeout().into_response();
    }
    response
}

async fn log_startup_state(resources: &ResourceBundle) {
    if let Some(embedder) = &resources.embedder {
        info!("📚 Embedder: {} ({} dims)", embedder.model(), embedder.dimension());
    }

    match &resources.index {
        Some(index) => match index.count().await {
            Ok(count) => info!("✅ Vector index loaded with {count} documents"),
            Err(e) => warn!("Vector index connected but count failed: {e}"),
        },
        None => info!("🔄 Vector index unavailable, falling back to general knowledge mode"),
    }

    match &resources.completer {
        Some(completer) => info!("🤖 Completion model: {}", completer.model()),
        None => warn!("Completion API key missing; /query will return 503"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}

