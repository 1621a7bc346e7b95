use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use reelytics_core::recommend::{self, TransparencyMetadata};
use reelytics_core::video::{CandidateQuery, VideoRepository};

use crate::{error::AppError, state::AppState};

const DEFAULT_LIMIT: i64 = 10;

/// Transparency disclosure header attached to every response.
static REC_REASON_HEADER: HeaderName = HeaderName::from_static("x-rec-reason");

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<i64>,
    /// Comma-separated video ids to exclude (already-seen feed items).
    pub exclude: Option<String>,
    /// Comma-separated interest tags. Affects reason text and the interest
    /// weight only — never the ordering.
    pub interests: Option<String>,
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// `GET /api/v1/recommendations?limit&exclude&interests`
///
/// Personalized when the `x-user-id` header identifies a user, cold start
/// (global popularity) otherwise. The ordering is the candidate pool's
/// view-count ordering in both paths; per-item `reason`/`weights` and the
/// response-level algorithm disclosure exist for transparency, not ranking.
#[tracing::instrument(skip(state, headers))]
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Response, AppError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);
    let exclude_ids = split_csv(query.exclude.as_deref());
    let interests = split_csv(query.interests.as_deref());

    let items = match user_id {
        Some(user_id) => {
            let pool = state
                .db
                .list_candidates(&CandidateQuery { limit, exclude_ids })
                .await?;
            tracing::debug!(user_id, count = pool.len(), "personalized candidate pool");
            recommend::personalized(pool, &interests, Utc::now())
        }
        None => {
            let pool = state.db.list_popular(limit).await?;
            recommend::cold_start(pool)
        }
    };

    let meta = TransparencyMetadata::current();
    let total = items.len();
    let mut response = Json(json!({
        "success": true,
        "data": items,
        "meta": {
            "total": total,
            "algorithm": meta.algorithm,
            "factors": meta.factors,
        }
    }))
    .into_response();

    // The disclosure accompanies every response regardless of path taken.
    let disclosure =
        serde_json::to_string(&meta).map_err(|e| AppError::Internal(e.into()))?;
    let value = HeaderValue::from_str(&disclosure)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("disclosure header: {e}")))?;
    response.headers_mut().insert(REC_REASON_HEADER.clone(), value);

    Ok(response)
}
