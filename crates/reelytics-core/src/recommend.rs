//! Recommendation ranking engine.
//!
//! Ranking is a fixed heuristic: the candidate pool arrives already ordered
//! (by view count, then recency) and is never re-sorted here. The `reason`
//! and `weights` on each item are transparency metadata surfaced to the
//! client, not inputs to the ordering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::video::Video;

/// View count above which a video counts as "popular" in reason strings.
const POPULAR_VIEW_COUNT: i64 = 1000;
/// Age under which a video counts as "recently uploaded".
const RECENT_UPLOAD_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationWeights {
    pub interest: f64,
    pub popularity: f64,
    pub recency: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub video: Video,
    pub reason: String,
    pub weights: RecommendationWeights,
}

/// Algorithm/factor disclosure attached to every recommendations response,
/// independent of which path produced it. Factor names only — the numeric
/// weights travel per item.
#[derive(Debug, Clone, Serialize)]
pub struct TransparencyMetadata {
    pub algorithm: &'static str,
    pub factors: [&'static str; 3],
    pub version: &'static str,
}

impl TransparencyMetadata {
    pub fn current() -> Self {
        Self {
            algorithm: "hybrid-scoring",
            factors: ["popularity", "recency", "user_interests"],
            version: "1.0",
        }
    }
}

/// Annotate an ordered candidate pool for a known user.
///
/// `interests` is accepted but not used for filtering or ordering — it only
/// switches the interest weight (0.4 vs 0.1) and adds a reason trigger.
pub fn personalized(
    videos: Vec<Video>,
    interests: &[String],
    now: DateTime<Utc>,
) -> Vec<RecommendationItem> {
    let weights = RecommendationWeights {
        interest: if interests.is_empty() { 0.1 } else { 0.4 },
        popularity: 0.4,
        recency: 0.2,
    };

    videos
        .into_iter()
        .map(|video| {
            let reason = recommendation_reason(&video, interests, now);
            RecommendationItem {
                video,
                reason,
                weights,
            }
        })
        .collect()
}

/// Annotate the global-popularity pool for anonymous or new users.
pub fn cold_start(videos: Vec<Video>) -> Vec<RecommendationItem> {
    videos
        .into_iter()
        .map(|video| RecommendationItem {
            video,
            reason: "Trending in your region".to_string(),
            weights: RecommendationWeights {
                interest: 0.0,
                popularity: 0.7,
                recency: 0.3,
            },
        })
        .collect()
}

/// Concatenate the applicable human-readable triggers for one candidate.
pub fn recommendation_reason(video: &Video, interests: &[String], now: DateTime<Utc>) -> String {
    let mut reasons: Vec<&str> = Vec::new();

    if video.view_count > POPULAR_VIEW_COUNT {
        reasons.push("Popular video");
    }
    if (now - video.created_at).num_days() < RECENT_UPLOAD_DAYS {
        reasons.push("Recently uploaded");
    }
    if !interests.is_empty() {
        reasons.push("Related to your interests");
    }

    if reasons.is_empty() {
        "Recommended for you".to_string()
    } else {
        reasons.join(" • ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{ModerationStatus, VideoVisibility};

    fn video(id: &str, view_count: i64, age_days: i64) -> Video {
        Video {
            id: id.to_string(),
            user_id: "user_1".to_string(),
            title: Some("clip".to_string()),
            description: None,
            status: "ready".to_string(),
            visibility: VideoVisibility::Public,
            moderation_status: ModerationStatus::Approved,
            duration_seconds: 30.0,
            view_count,
            like_count: 0,
            created_at: Utc::now() - chrono::Duration::days(age_days),
        }
    }

    #[test]
    fn reason_concatenates_all_triggers() {
        let interests = vec!["skate".to_string()];
        let reason = recommendation_reason(&video("v", 5000, 2), &interests, Utc::now());
        assert_eq!(
            reason,
            "Popular video • Recently uploaded • Related to your interests"
        );
    }

    #[test]
    fn reason_falls_back_when_nothing_triggers() {
        let reason = recommendation_reason(&video("v", 10, 30), &[], Utc::now());
        assert_eq!(reason, "Recommended for you");
    }

    #[test]
    fn popular_threshold_is_strict() {
        let reason = recommendation_reason(&video("v", 1000, 30), &[], Utc::now());
        assert_eq!(reason, "Recommended for you");
    }

    #[test]
    fn interest_weight_switches_on_interest_list() {
        let now = Utc::now();
        let with = personalized(vec![video("a", 0, 30)], &["music".to_string()], now);
        let without = personalized(vec![video("a", 0, 30)], &[], now);
        assert_eq!(with[0].weights.interest, 0.4);
        assert_eq!(without[0].weights.interest, 0.1);
        assert_eq!(with[0].weights.popularity, 0.4);
        assert_eq!(with[0].weights.recency, 0.2);
    }

    #[test]
    fn personalized_preserves_pool_order() {
        let pool = vec![video("a", 9000, 1), video("b", 50, 1), video("c", 5, 1)];
        let items = personalized(pool, &[], Utc::now());
        let ids: Vec<&str> = items.iter().map(|i| i.video.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn cold_start_uses_fixed_reason_and_weights() {
        let items = cold_start(vec![video("a", 100, 1)]);
        assert_eq!(items[0].reason, "Trending in your region");
        assert_eq!(items[0].weights.interest, 0.0);
        assert_eq!(items[0].weights.popularity, 0.7);
        assert_eq!(items[0].weights.recency, 0.3);
    }
}
