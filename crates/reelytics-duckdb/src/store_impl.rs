//! Trait wiring: the DuckDB backend as the event store and video repository.

use async_trait::async_trait;

use reelytics_core::event::AnalyticsEvent;
use reelytics_core::store::{EventFilter, EventStore, VideoViewCount};
use reelytics_core::video::{CandidateQuery, Video, VideoRepository};

use crate::DuckDbBackend;

#[async_trait]
impl EventStore for DuckDbBackend {
    async fn append(&self, events: &[AnalyticsEvent]) -> anyhow::Result<usize> {
        DuckDbBackend::insert_events(self, events).await
    }

    async fn query(&self, filter: &EventFilter) -> anyhow::Result<Vec<AnalyticsEvent>> {
        crate::queries::events::query_events(self, filter).await
    }

    async fn count(&self, filter: &EventFilter) -> anyhow::Result<i64> {
        crate::queries::events::count_events(self, filter).await
    }

    async fn distinct_user_count(&self, filter: &EventFilter) -> anyhow::Result<i64> {
        crate::queries::events::distinct_user_count(self, filter).await
    }

    async fn video_view_counts(
        &self,
        filter: &EventFilter,
        min_count: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<VideoViewCount>> {
        crate::queries::events::video_view_counts(self, filter, min_count, limit).await
    }

    async fn avg_play_duration_ms(&self, filter: &EventFilter) -> anyhow::Result<f64> {
        crate::queries::events::avg_play_duration_ms(self, filter).await
    }
}

#[async_trait]
impl VideoRepository for DuckDbBackend {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Video>> {
        crate::queries::videos::get_video(self, id).await
    }

    async fn list_candidates(&self, query: &CandidateQuery) -> anyhow::Result<Vec<Video>> {
        crate::queries::videos::list_candidates(self, query).await
    }

    async fn list_popular(&self, limit: i64) -> anyhow::Result<Vec<Video>> {
        crate::queries::videos::list_popular(self, limit).await
    }

    async fn list_recent_ready(&self, limit: i64) -> anyhow::Result<Vec<Video>> {
        crate::queries::videos::list_recent_ready(self, limit).await
    }

    async fn increment_view_count(&self, id: &str) -> anyhow::Result<()> {
        crate::queries::videos::increment_view_count(self, id).await
    }

    async fn adjust_like_count(&self, id: &str, delta: i64) -> anyhow::Result<()> {
        crate::queries::videos::adjust_like_count(self, id, delta).await
    }
}
