//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket hint sessions at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/classify", post(http::http_post_classify))
        .route("/api/v1/classify/source", post(http::http_post_classify_source))
        .route("/api/v1/problems", get(http::http_list_problems))
        .route("/api/v1/problems/:id", get(http::http_get_problem))
        .route("/api/v1/translate", post(http::http_post_translate))
        .route("/api/v1/languages", get(http::http_get_languages))
        .route("/api/v1/users/:id/profile", get(http::http_get_profile))
        .route("/api/v1/users/:id/preferences", put(http::http_put_preferences))
        .route("/api/v1/users/:id/recommendations", get(http::http_get_recommendations))
        .route("/api/v1/users/:id/feedback", post(http::http_post_feedback))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
