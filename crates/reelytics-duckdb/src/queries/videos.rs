//! Reads and counter updates against the collaborator-owned `videos` table.

use anyhow::Result;

use reelytics_core::video::{CandidateQuery, ModerationStatus, Video, VideoVisibility};

use crate::backend::rand_hex;
use crate::queries::events::parse_ts;
use crate::DuckDbBackend;

const VIDEO_COLUMNS: &str = "id, user_id, title, description, status, visibility, \
     moderation_status, duration_seconds, view_count, like_count, \
     CAST(created_at AS VARCHAR)";

type VideoRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
    f64,
    i64,
    i64,
    String,
);

fn map_row(row: &duckdb::Row<'_>) -> duckdb::Result<VideoRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn into_video(raw: VideoRow) -> Result<Video> {
    let (
        id,
        user_id,
        title,
        description,
        status,
        visibility,
        moderation_status,
        duration_seconds,
        view_count,
        like_count,
        ts,
    ) = raw;
    Ok(Video {
        id,
        user_id,
        title,
        description,
        status,
        visibility: VideoVisibility::parse(&visibility),
        moderation_status: ModerationStatus::parse(&moderation_status),
        duration_seconds,
        view_count,
        like_count,
        created_at: parse_ts(&ts)?,
    })
}

pub async fn get_video(db: &DuckDbBackend, id: &str) -> Result<Option<Video>> {
    let conn = db.conn.lock().await;
    let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(duckdb::params![id], map_row)?;
    match rows.next() {
        Some(row) => Ok(Some(into_video(row?)?)),
        None => Ok(None),
    }
}

/// Personalized candidate pool: public + approved, exclusions removed,
/// most-viewed first with recency as the tie-breaker.
pub async fn list_candidates(db: &DuckDbBackend, query: &CandidateQuery) -> Result<Vec<Video>> {
    let conn = db.conn.lock().await;

    let mut params: Vec<Box<dyn duckdb::types::ToSql>> = Vec::new();
    let mut exclusion_sql = String::new();
    if !query.exclude_ids.is_empty() {
        let placeholders: Vec<String> = query
            .exclude_ids
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect();
        exclusion_sql = format!(" AND id NOT IN ({})", placeholders.join(", "));
        for id in &query.exclude_ids {
            params.push(Box::new(id.clone()));
        }
    }

    let sql = format!(
        "SELECT {VIDEO_COLUMNS} FROM videos \
         WHERE visibility = 'PUBLIC' AND moderation_status = 'APPROVED'{exclusion_sql} \
         ORDER BY view_count DESC, created_at DESC \
         LIMIT ?{}",
        params.len() + 1
    );
    params.push(Box::new(query.limit));

    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), map_row)?;

    let mut videos = Vec::new();
    for row in rows {
        videos.push(into_video(row?)?);
    }
    Ok(videos)
}

/// Cold-start pool: public + approved, purely by global view count.
pub async fn list_popular(db: &DuckDbBackend, limit: i64) -> Result<Vec<Video>> {
    let conn = db.conn.lock().await;
    let sql = format!(
        "SELECT {VIDEO_COLUMNS} FROM videos \
         WHERE visibility = 'PUBLIC' AND moderation_status = 'APPROVED' \
         ORDER BY view_count DESC \
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(duckdb::params![limit], map_row)?;

    let mut videos = Vec::new();
    for row in rows {
        videos.push(into_video(row?)?);
    }
    Ok(videos)
}

/// Newest transcoded videos, for the hourly scoring job.
pub async fn list_recent_ready(db: &DuckDbBackend, limit: i64) -> Result<Vec<Video>> {
    let conn = db.conn.lock().await;
    let sql = format!(
        "SELECT {VIDEO_COLUMNS} FROM videos \
         WHERE status = 'ready' \
         ORDER BY created_at DESC \
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(duckdb::params![limit], map_row)?;

    let mut videos = Vec::new();
    for row in rows {
        videos.push(into_video(row?)?);
    }
    Ok(videos)
}

pub async fn increment_view_count(db: &DuckDbBackend, id: &str) -> Result<()> {
    let conn = db.conn.lock().await;
    conn.execute(
        "UPDATE videos SET view_count = view_count + 1 WHERE id = ?1",
        duckdb::params![id],
    )?;
    Ok(())
}

/// `like_count += delta`, floored at zero so an unlike replayed after a
/// count reset never goes negative.
pub async fn adjust_like_count(db: &DuckDbBackend, id: &str, delta: i64) -> Result<()> {
    let conn = db.conn.lock().await;
    conn.execute(
        "UPDATE videos SET like_count = GREATEST(like_count + ?1, 0) WHERE id = ?2",
        duckdb::params![delta, id],
    )?;
    Ok(())
}

impl DuckDbBackend {
    /// Insert a video record, generating a `vid_` id when the given one is
    /// empty. Returns the id actually stored.
    ///
    /// Video rows are owned by the upload subsystem in production; this
    /// entry point exists for seeding and tests.
    pub async fn insert_video(&self, video: &Video) -> Result<String> {
        let id = if video.id.is_empty() {
            format!("vid_{}", rand_hex(5))
        } else {
            video.id.clone()
        };
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO videos (
                id, user_id, title, description, status, visibility,
                moderation_status, duration_seconds, view_count, like_count,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            duckdb::params![
                id,
                video.user_id,
                video.title,
                video.description,
                video.status,
                video.visibility.as_str(),
                video.moderation_status.as_str(),
                video.duration_seconds,
                video.view_count,
                video.like_count,
                video.created_at.to_rfc3339(),
            ],
        )?;
        Ok(id)
    }
}
