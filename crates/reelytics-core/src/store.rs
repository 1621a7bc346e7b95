//! Event store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::AnalyticsEvent;

/// Trending scan: trailing window length in minutes.
pub const TRENDING_WINDOW_MINUTES: i64 = 15;
/// Trending scan: a video qualifies only with strictly more view starts
/// than this in the window.
pub const TRENDING_MIN_VIEWS: i64 = 10;
/// Trending scan: maximum number of videos surfaced.
pub const TRENDING_LIMIT: i64 = 10;

/// Typed filter applied uniformly to event-store reads.
///
/// Every dimension is optional; `None` means "do not constrain". The time
/// range is `since <= created_at < until`, with either bound omittable.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub user_id: Option<String>,
    pub video_id: Option<String>,
    pub event_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl EventFilter {
    /// All events for one user since `since`.
    pub fn for_user(user_id: &str, since: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            since: Some(since),
            ..Self::default()
        }
    }

    /// All events for one video since `since`.
    pub fn for_video(video_id: &str, since: DateTime<Utc>) -> Self {
        Self {
            video_id: Some(video_id.to_string()),
            since: Some(since),
            ..Self::default()
        }
    }

    pub fn with_event_type(mut self, event_type: &str) -> Self {
        self.event_type = Some(event_type.to_string());
        self
    }
}

/// One row of the trending group-count: a video and its view-start count
/// inside the scan window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoViewCount {
    pub video_id: String,
    pub views: i64,
}

/// Append-only store of interaction events.
///
/// Appends and range scans may run concurrently; readers only ever observe
/// a prefix of committed events, never partial or mutated records.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Append a batch of events atomically. Returns the accepted count.
    async fn append(&self, events: &[AnalyticsEvent]) -> anyhow::Result<usize>;

    /// Fetch events matching `filter`, ordered by `created_at` descending.
    async fn query(&self, filter: &EventFilter) -> anyhow::Result<Vec<AnalyticsEvent>>;

    /// Count events matching `filter`.
    async fn count(&self, filter: &EventFilter) -> anyhow::Result<i64>;

    /// Count distinct non-null `user_id` values matching `filter` (DAU).
    async fn distinct_user_count(&self, filter: &EventFilter) -> anyhow::Result<i64>;

    /// Group matching events by `video_id`, keep groups with strictly more
    /// than `min_count` rows, order by count descending, take `limit`.
    async fn video_view_counts(
        &self,
        filter: &EventFilter,
        min_count: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<VideoViewCount>>;

    /// Mean `meta.play_duration_ms` over matching events, 0.0 when no
    /// matching event carries the field.
    async fn avg_play_duration_ms(&self, filter: &EventFilter) -> anyhow::Result<f64>;
}
