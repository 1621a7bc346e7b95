//! Aggregation engine: pure functions turning a time-bounded slice of
//! events into derived profiles and scores.
//!
//! Nothing here touches storage. Callers fetch the window they want
//! (30 days for user profiles, 7 days for video scores) and pass the slice
//! in, newest-first as the store returns it. Results are never persisted —
//! every call recomputes from scratch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::{event_type, AnalyticsEvent};

/// Rolling window for user activity profiles.
pub const PROFILE_WINDOW_DAYS: i64 = 30;
/// Rolling window for video performance scores.
pub const SCORE_WINDOW_DAYS: i64 = 7;

/// Sentiment analysis is unimplemented; every score carries this constant.
const COMMENT_SENTIMENT_STUB: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityProfile {
    pub user_id: String,
    pub total_watch_time_ms: f64,
    pub videos_watched: i64,
    /// 0–100, one decimal.
    pub avg_completion_rate: f64,
    /// Always empty: topic inference is a placeholder pending content
    /// metadata analysis.
    pub preferred_topics: Vec<String>,
    /// 0–100, one decimal.
    pub engagement_score: f64,
    pub last_active_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactors {
    pub completion_rate: f64,
    pub like_ratio: f64,
    pub share_velocity: f64,
    pub comment_sentiment: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPerformanceScore {
    pub video_id: String,
    /// 0–100, one decimal.
    pub quality_score: f64,
    /// 0–100, one decimal.
    pub viral_potential: f64,
    /// `1 + quality_score / 100`, so 1.0–2.0.
    pub engagement_multiplier: f64,
    pub factors: ScoreFactors,
}

/// Creator-dashboard aggregates for one video over an optional date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalytics {
    pub video_id: String,
    pub views: i64,
    pub avg_watch_time_ms: i64,
    /// Percent, one decimal.
    pub completion_rate: f64,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn count_of(events: &[AnalyticsEvent], ty: &str) -> i64 {
    events.iter().filter(|e| e.event_type == ty).count() as i64
}

/// Build a user's activity profile from their in-window events.
///
/// `events` must be newest-first (store order). `now` anchors
/// `last_active_at` when the user has no in-window events.
pub fn user_profile(
    user_id: &str,
    events: &[AnalyticsEvent],
    now: DateTime<Utc>,
) -> UserActivityProfile {
    let views = count_of(events, event_type::VIEW_START);
    let completes = count_of(events, event_type::VIEW_COMPLETE);
    let likes = count_of(events, event_type::LIKE);
    let shares = count_of(events, event_type::SHARE);
    let comments = count_of(events, event_type::COMMENT);

    // Watch time sums across all fetched events, not just view events.
    let total_watch_time_ms: f64 = events
        .iter()
        .filter_map(|e| e.meta.play_duration_ms)
        .sum();

    let avg_completion_rate = if views > 0 {
        completes as f64 / views as f64 * 100.0
    } else {
        0.0
    };

    // Interaction weight normalized per view, rescaled into a 0–100 band.
    // The max(1, views) guard keeps zero-view users with interactions finite.
    let engagement_score = ((likes as f64 * 2.0
        + shares as f64 * 5.0
        + comments as f64 * 3.0
        + views as f64 * 0.5)
        / views.max(1) as f64
        * 10.0)
        .min(100.0);

    UserActivityProfile {
        user_id: user_id.to_string(),
        total_watch_time_ms,
        videos_watched: views,
        avg_completion_rate: round1(avg_completion_rate),
        preferred_topics: Vec::new(),
        engagement_score: round1(engagement_score),
        last_active_at: events.first().map(|e| e.created_at).unwrap_or(now),
    }
}

/// Score a video from its events over the trailing 7-day window.
///
/// The caller resolves the video first; an unknown id never reaches here.
pub fn video_score(video_id: &str, events: &[AnalyticsEvent]) -> VideoPerformanceScore {
    let views = count_of(events, event_type::VIEW_START);
    let completes = count_of(events, event_type::VIEW_COMPLETE);
    let likes = count_of(events, event_type::LIKE);
    let shares = count_of(events, event_type::SHARE);

    let completion_rate = if views > 0 {
        completes as f64 / views as f64
    } else {
        0.0
    };
    let like_ratio = if views > 0 {
        likes as f64 / views as f64
    } else {
        0.0
    };
    // Shares per day, unconditional — not gated on views.
    let share_velocity = shares as f64 / SCORE_WINDOW_DAYS as f64;

    // Completion dominates at 40%; share velocity is capped at 1/day so a
    // single viral spike cannot saturate the score.
    let quality_score =
        completion_rate * 40.0 + like_ratio * 30.0 + share_velocity.min(1.0) * 30.0;

    let viral_potential = (share_velocity * 20.0 + like_ratio * 50.0).min(100.0);

    VideoPerformanceScore {
        video_id: video_id.to_string(),
        quality_score: round1(quality_score),
        viral_potential: round1(viral_potential),
        engagement_multiplier: 1.0 + quality_score / 100.0,
        factors: ScoreFactors {
            completion_rate: round2(completion_rate),
            like_ratio: round2(like_ratio),
            share_velocity: round2(share_velocity),
            comment_sentiment: COMMENT_SENTIMENT_STUB,
        },
    }
}

/// Assemble creator-dashboard aggregates from per-type counts.
///
/// `avg_watch_time_ms` is the store's mean over `view_percent` events.
pub fn video_analytics(
    video_id: &str,
    views: i64,
    completes: i64,
    likes: i64,
    shares: i64,
    comments: i64,
    avg_watch_time_ms: f64,
) -> VideoAnalytics {
    let completion_rate = if views > 0 {
        completes as f64 / views as f64 * 100.0
    } else {
        0.0
    };
    VideoAnalytics {
        video_id: video_id.to_string(),
        views,
        avg_watch_time_ms: avg_watch_time_ms.round() as i64,
        completion_rate: round1(completion_rate),
        likes,
        shares,
        comments,
    }
}

/// Derive human-readable creator guidance from dashboard aggregates.
pub fn video_insights(analytics: &VideoAnalytics) -> Vec<String> {
    let mut insights = Vec::new();

    if analytics.completion_rate < 30.0 {
        insights.push("Most viewers drop off early. Consider a stronger hook.".to_string());
    }
    if analytics.completion_rate > 70.0 {
        insights.push("Great retention! Viewers are watching till the end.".to_string());
    }

    if analytics.views > 0 {
        let views = analytics.views as f64;
        if analytics.likes as f64 / views > 0.1 {
            insights.push("High like ratio! Your content resonates well.".to_string());
        }
        if analytics.shares as f64 / views > 0.05 {
            insights.push("Good shareability! Viewers find this worth sharing.".to_string());
        }
    }

    if insights.is_empty() {
        insights.push("Keep creating! More data needed.".to_string());
    }
    insights
}
