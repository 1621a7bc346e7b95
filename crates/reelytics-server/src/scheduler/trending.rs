//! Periodic trending detection over the sliding view window.

use std::sync::Arc;

use tracing::info;

use crate::state::AppState;

pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let trending = state.detect_trending().await?;
    info!(count = trending.len(), "Trending detection pass complete");
    Ok(())
}
