//! Daily active user rollup, run at local midnight.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use reelytics_core::store::{EventFilter, EventStore};

use crate::state::AppState;

pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let filter = EventFilter {
        since: Some(Utc::now() - Duration::hours(24)),
        ..EventFilter::default()
    };
    let active_users = state.db.distinct_user_count(&filter).await?;
    info!(active_users, "Daily active user rollup complete");
    Ok(())
}
