use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive by default; restricted to
///    `REELYTICS_CORS_ORIGINS` when configured.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/v1/events", post(routes::events::ingest))
        .route(
            "/api/v1/videos/{id}/analytics",
            get(routes::videos::video_analytics),
        )
        .route(
            "/api/v1/videos/{id}/insights",
            get(routes::videos::video_insights),
        )
        .route("/api/v1/videos/{id}/score", get(routes::videos::video_score))
        .route("/api/v1/videos/{id}/view", post(routes::videos::confirm_view))
        .route(
            "/api/v1/videos/{id}/like",
            post(routes::videos::like).delete(routes::videos::unlike),
        )
        .route(
            "/api/v1/users/{id}/profile",
            get(routes::profiles::user_profile),
        )
        .route("/api/v1/trending", get(routes::trending::trending))
        .route(
            "/api/v1/recommendations",
            get(routes::recommendations::recommendations),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
