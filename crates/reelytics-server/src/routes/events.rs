use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use reelytics_core::event::{AnalyticsEvent, IngestBatch};
use reelytics_core::store::EventStore;

use crate::{error::AppError, state::AppState};

/// `POST /api/v1/events` — ingest a batch of interaction events.
///
/// ## Caller identity
/// The authenticated user id arrives in the `x-user-id` header (session
/// issuance itself is owned by the gateway). Requests without it are
/// rejected with 400.
///
/// ## Batch rules
/// - Maximum `REELYTICS_MAX_BATCH` events per batch (default 50).
/// - Empty batches are rejected.
/// - No per-event validation beyond structural defaults: missing `meta`
///   and `context` become empty structs, and unrecognized `eventType`
///   strings are stored verbatim.
///
/// ## Response
/// `202 Accepted` with `{ "success": true, "count": n }` where `count` is
/// the number of events durably appended.
#[tracing::instrument(skip(state, headers, batch))]
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(batch): Json<IngestBatch>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("x-user-id header required".to_string()))?
        .to_string();

    if batch.events.is_empty() {
        return Err(AppError::BadRequest("empty batch".to_string()));
    }
    if batch.events.len() > state.config.max_batch_size {
        return Err(AppError::BatchTooLarge(batch.events.len()));
    }

    // Server assigns ids and timestamps; one timestamp for the whole batch
    // keeps insertion order non-decreasing.
    let now = Utc::now();
    let events: Vec<AnalyticsEvent> = batch
        .events
        .into_iter()
        .map(|e| AnalyticsEvent {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: e.event_type,
            user_id: Some(user_id.clone()),
            video_id: e.video_id,
            session_id: e.session_id,
            meta: e.meta,
            context: e.context,
            created_at: now,
        })
        .collect();

    let count = state.db.append(&events).await?;
    tracing::info!(count, user_id = %user_id, "Recorded ingest batch");

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(json!({ "success": true, "count": count })),
    ))
}
