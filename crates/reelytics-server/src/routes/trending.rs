use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use reelytics_core::store::TRENDING_WINDOW_MINUTES;

use crate::{error::AppError, state::AppState};

/// `GET /api/v1/trending` — videos with an abnormal view-start velocity in
/// the trailing 15-minute window. Read-only; the same scan the 10-minute
/// scheduled job runs.
#[tracing::instrument(skip(state))]
pub async fn trending(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let videos = state.detect_trending().await?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "windowMinutes": TRENDING_WINDOW_MINUTES,
            "videos": videos,
        }
    })))
}
