//! Video repository abstraction.
//!
//! Videos are owned by the upload/CRUD subsystem; this crate only reads the
//! fields the ranking and scoring paths need, plus the two atomic counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoVisibility {
    Public,
    Private,
    Unlisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

impl VideoVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::Unlisted => "UNLISTED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "PRIVATE" => Self::Private,
            "UNLISTED" => Self::Unlisted,
            _ => Self::Public,
        }
    }
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Flagged => "FLAGGED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "APPROVED" => Self::Approved,
            "REJECTED" => Self::Rejected,
            "FLAGGED" => Self::Flagged,
            _ => Self::Pending,
        }
    }
}

/// The slice of a video record this subsystem reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Processing pipeline status: "processing" until transcoding finishes,
    /// then "ready".
    pub status: String,
    pub visibility: VideoVisibility,
    pub moderation_status: ModerationStatus,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Candidate-pool query for personalized recommendations.
///
/// The pool is always restricted to `visibility = PUBLIC` and
/// `moderation_status = APPROVED`, ordered by `view_count` descending then
/// `created_at` descending.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub limit: i64,
    pub exclude_ids: Vec<String>,
}

impl Default for CandidateQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            exclude_ids: Vec::new(),
        }
    }
}

/// Read/counter interface over the externally-owned video records.
#[async_trait]
pub trait VideoRepository: Send + Sync + 'static {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Video>>;

    /// Personalized candidate pool (public, approved, exclusions applied,
    /// `view_count DESC, created_at DESC`, truncated to `query.limit`).
    async fn list_candidates(&self, query: &CandidateQuery) -> anyhow::Result<Vec<Video>>;

    /// Cold-start pool: public, approved, ordered purely by `view_count`
    /// descending.
    async fn list_popular(&self, limit: i64) -> anyhow::Result<Vec<Video>>;

    /// Most recently created videos with status "ready", newest first.
    /// Used by the hourly scoring job.
    async fn list_recent_ready(&self, limit: i64) -> anyhow::Result<Vec<Video>>;

    /// Atomic `view_count += 1`. Unknown id is a no-op at this layer; the
    /// route resolves the video first and surfaces NotFound.
    async fn increment_view_count(&self, id: &str) -> anyhow::Result<()>;

    /// Atomic `like_count += delta`, floored at zero.
    async fn adjust_like_count(&self, id: &str, delta: i64) -> anyhow::Result<()>;
}
