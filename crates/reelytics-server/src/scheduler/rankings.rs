//! Hourly performance scoring over recently published videos.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use reelytics_core::aggregate::{self, SCORE_WINDOW_DAYS};
use reelytics_core::store::{EventFilter, EventStore};
use reelytics_core::video::VideoRepository;

use crate::state::AppState;

const SCORING_BATCH: i64 = 100;

pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let videos = state.db.list_recent_ready(SCORING_BATCH).await?;
    let since = Utc::now() - Duration::days(SCORE_WINDOW_DAYS);
    let mut scored = 0usize;
    for video in &videos {
        let filter = EventFilter::for_video(&video.id, since);
        match state.db.query(&filter).await {
            Ok(events) => {
                let score = aggregate::video_score(&video.id, &events);
                debug!(
                    video_id = %video.id,
                    quality = score.quality_score,
                    viral = score.viral_potential,
                    "scored video"
                );
                scored += 1;
            }
            Err(err) => {
                warn!(video_id = %video.id, error = %err, "failed to score video");
            }
        }
    }
    info!(total = videos.len(), scored, "Video scoring pass complete");
    Ok(())
}
