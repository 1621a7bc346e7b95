use std::sync::Arc;

use chrono::{Duration, Utc};

use reelytics_core::config::Config;
use reelytics_core::store::{
    EventFilter, EventStore, VideoViewCount, TRENDING_LIMIT, TRENDING_MIN_VIEWS,
    TRENDING_WINDOW_MINUTES,
};
use reelytics_core::event::event_type;
use reelytics_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// All fields are cheap to clone; the DuckDB backend already wraps its
/// connection in `Arc<tokio::sync::Mutex<_>>`.
pub struct AppState {
    pub db: Arc<DuckDbBackend>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }

    /// Scan the trailing 15-minute window for videos with an abnormal
    /// view-start velocity: strictly more than 10 view starts, top 10 by
    /// count. Shared by the trending endpoint and the 10-minute job.
    pub async fn detect_trending(&self) -> anyhow::Result<Vec<VideoViewCount>> {
        let since = Utc::now() - Duration::minutes(TRENDING_WINDOW_MINUTES);
        let filter = EventFilter {
            event_type: Some(event_type::VIEW_START.to_string()),
            since: Some(since),
            ..EventFilter::default()
        };
        self.db
            .video_view_counts(&filter, TRENDING_MIN_VIEWS, TRENDING_LIMIT)
            .await
    }
}
