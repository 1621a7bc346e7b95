use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde_json::json;

use reelytics_core::aggregate::{self, PROFILE_WINDOW_DAYS};
use reelytics_core::store::{EventFilter, EventStore};

use crate::{error::AppError, state::AppState};

/// `GET /api/v1/users/{id}/profile` — 30-day activity profile.
///
/// A pure function of the event store at call time: nothing is cached, and
/// a user with no in-window events gets an all-zero profile rather than an
/// error (user records are owned elsewhere; this subsystem never resolves
/// them).
#[tracing::instrument(skip(state))]
pub async fn user_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let since = now - Duration::days(PROFILE_WINDOW_DAYS);
    let events = state.db.query(&EventFilter::for_user(&id, since)).await?;
    let profile = aggregate::user_profile(&id, &events, now);
    Ok(Json(json!({ "success": true, "data": profile })))
}
