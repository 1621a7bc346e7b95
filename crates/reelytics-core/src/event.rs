use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical interaction event types emitted by the mobile client.
///
/// The ingestion boundary is deliberately tolerant: an `event_type` outside
/// this list is stored verbatim as an opaque string rather than rejected.
/// Aggregations simply never match it.
pub mod event_type {
    pub const VIEW_START: &str = "view_start";
    pub const VIEW_PERCENT: &str = "view_percent";
    pub const VIEW_COMPLETE: &str = "view_complete";
    pub const SKIP: &str = "skip";
    pub const LIKE: &str = "like";
    pub const UNLIKE: &str = "unlike";
    pub const SAVE: &str = "save";
    pub const UNSAVE: &str = "unsave";
    pub const SHARE: &str = "share";
    pub const COMMENT: &str = "comment";
    pub const REPORT: &str = "report";
}

/// Playback measurements attached to an event. Every field is optional;
/// clients send whatever the player had at hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventMeta {
    pub play_duration_ms: Option<f64>,
    pub video_duration_ms: Option<f64>,
    pub percent_watched: Option<f64>,
    pub is_scrubbing: Option<bool>,
    pub volume_level: Option<f64>,
}

/// Client environment captured alongside an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventContext {
    pub network: Option<String>,
    pub device_model: Option<String>,
    pub app_version: Option<String>,
    pub locale: Option<String>,
}

/// One event as submitted to POST /api/v1/events.
/// Wire fields are camelCase to match the iOS client payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestEvent {
    pub event_type: String,
    pub video_id: Option<String>,
    pub session_id: Option<String>,
    /// Missing meta defaults to an empty struct, never null.
    #[serde(default)]
    pub meta: EventMeta,
    #[serde(default)]
    pub context: EventContext,
}

/// Request body for batch ingestion: `{ "events": [...] }`.
#[derive(Debug, Deserialize)]
pub struct IngestBatch {
    pub events: Vec<IngestEvent>,
}

/// The stored, immutable version of an interaction event.
///
/// `id` and `created_at` are assigned at write time by the server.
/// Once appended an event is never mutated or deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub event_type: String,
    pub user_id: Option<String>,
    pub video_id: Option<String>,
    pub session_id: Option<String>,
    pub meta: EventMeta,
    pub context: EventContext,
    pub created_at: DateTime<Utc>,
}
