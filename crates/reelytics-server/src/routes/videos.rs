use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use reelytics_core::aggregate::{self, VideoAnalytics, SCORE_WINDOW_DAYS};
use reelytics_core::event::event_type;
use reelytics_core::store::{EventFilter, EventStore};
use reelytics_core::video::{Video, VideoRepository};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_date(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::BadRequest(format!("invalid {field}: {e}")))
}

async fn resolve_video(state: &AppState, id: &str) -> Result<Video, AppError> {
    state
        .db
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown video: {id}")))
}

/// Assemble the creator-dashboard aggregates for a video over an optional
/// date range: per-type counts plus the mean watch time reported by
/// `view_percent` progress events.
async fn fetch_analytics(
    state: &AppState,
    video_id: &str,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<VideoAnalytics, AppError> {
    let base = EventFilter {
        video_id: Some(video_id.to_string()),
        since,
        until,
        ..EventFilter::default()
    };
    let typed = |ty: &str| EventFilter {
        event_type: Some(ty.to_string()),
        ..base.clone()
    };

    let views = state.db.count(&typed(event_type::VIEW_START)).await?;
    let completes = state.db.count(&typed(event_type::VIEW_COMPLETE)).await?;
    let likes = state.db.count(&typed(event_type::LIKE)).await?;
    let shares = state.db.count(&typed(event_type::SHARE)).await?;
    let comments = state.db.count(&typed(event_type::COMMENT)).await?;
    let avg_watch_time_ms = state
        .db
        .avg_play_duration_ms(&typed(event_type::VIEW_PERCENT))
        .await?;

    Ok(aggregate::video_analytics(
        video_id,
        views,
        completes,
        likes,
        shares,
        comments,
        avg_watch_time_ms,
    ))
}

/// `GET /api/v1/videos/{id}/analytics?startDate&endDate` — creator
/// dashboard aggregates. Date bounds are RFC 3339; the lower bound is
/// inclusive, the upper exclusive; either may be omitted.
#[tracing::instrument(skip(state))]
pub async fn video_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(range): Query<AnalyticsRange>,
) -> Result<impl IntoResponse, AppError> {
    resolve_video(&state, &id).await?;

    let since = range
        .start_date
        .as_deref()
        .map(|raw| parse_date(raw, "startDate"))
        .transpose()?;
    let until = range
        .end_date
        .as_deref()
        .map(|raw| parse_date(raw, "endDate"))
        .transpose()?;

    let analytics = fetch_analytics(&state, &id, since, until).await?;
    Ok(Json(json!({ "success": true, "data": analytics })))
}

/// `GET /api/v1/videos/{id}/insights` — human-readable creator guidance
/// derived from the all-time analytics aggregates.
#[tracing::instrument(skip(state))]
pub async fn video_insights(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    resolve_video(&state, &id).await?;
    let analytics = fetch_analytics(&state, &id, None, None).await?;
    let insights = aggregate::video_insights(&analytics);
    Ok(Json(json!({ "success": true, "data": { "insights": insights } })))
}

/// `GET /api/v1/videos/{id}/score` — the 7-day performance score used by
/// the ranking pipeline. Recomputed fresh on every call.
#[tracing::instrument(skip(state))]
pub async fn video_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    resolve_video(&state, &id).await?;

    let since = Utc::now() - Duration::days(SCORE_WINDOW_DAYS);
    let events = state.db.query(&EventFilter::for_video(&id, since)).await?;
    let score = aggregate::video_score(&id, &events);
    Ok(Json(json!({ "success": true, "data": score })))
}

/// `POST /api/v1/videos/{id}/view` — view confirmation; bumps the video's
/// `view_count` atomically.
#[tracing::instrument(skip(state))]
pub async fn confirm_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    resolve_video(&state, &id).await?;
    state.db.increment_view_count(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/videos/{id}/like`
#[tracing::instrument(skip(state))]
pub async fn like(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    resolve_video(&state, &id).await?;
    state.db.adjust_like_count(&id, 1).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/videos/{id}/like` — floored at zero in the store.
#[tracing::instrument(skip(state))]
pub async fn unlike(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    resolve_video(&state, &id).await?;
    state.db.adjust_like_count(&id, -1).await?;
    Ok(StatusCode::NO_CONTENT)
}
