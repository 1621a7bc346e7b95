//! Event-store reads: filtered scans, counts, and the trending group-count.
//!
//! All queries take the typed [`EventFilter`] and compile it into a
//! parameterized WHERE clause — no caller-supplied strings ever reach SQL.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};

use reelytics_core::event::{AnalyticsEvent, EventContext, EventMeta};
use reelytics_core::store::{EventFilter, VideoViewCount};

use crate::DuckDbBackend;

/// Parse a DuckDB `CAST(created_at AS VARCHAR)` value back into UTC.
///
/// DuckDB renders timestamps as `2026-08-29 12:34:56.789`; rows written
/// without fractional seconds fall back to the seconds-only format.
pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|e| anyhow::anyhow!("unparseable timestamp {raw:?}: {e}"))
}

/// Compile `filter` into `(" WHERE ...", params)` starting at `?1`.
///
/// Returns an empty clause string when the filter is unconstrained.
fn filter_clauses(filter: &EventFilter) -> (String, Vec<Box<dyn duckdb::types::ToSql>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn duckdb::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(ref user_id) = filter.user_id {
        clauses.push(format!("user_id = ?{param_idx}"));
        params.push(Box::new(user_id.clone()));
        param_idx += 1;
    }
    if let Some(ref video_id) = filter.video_id {
        clauses.push(format!("video_id = ?{param_idx}"));
        params.push(Box::new(video_id.clone()));
        param_idx += 1;
    }
    if let Some(ref event_type) = filter.event_type {
        clauses.push(format!("event_type = ?{param_idx}"));
        params.push(Box::new(event_type.clone()));
        param_idx += 1;
    }
    if let Some(since) = filter.since {
        clauses.push(format!("created_at >= ?{param_idx}"));
        params.push(Box::new(since.to_rfc3339()));
        param_idx += 1;
    }
    if let Some(until) = filter.until {
        clauses.push(format!("created_at < ?{param_idx}"));
        params.push(Box::new(until.to_rfc3339()));
    }

    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (sql, params)
}

pub async fn query_events(
    db: &DuckDbBackend,
    filter: &EventFilter,
) -> Result<Vec<AnalyticsEvent>> {
    let conn = db.conn.lock().await;
    let (filter_sql, mut params) = filter_clauses(filter);

    let mut sql = format!(
        "SELECT id, event_type, user_id, video_id, session_id, \
                play_duration_ms, video_duration_ms, percent_watched, \
                is_scrubbing, volume_level, \
                network, device_model, app_version, locale, \
                CAST(created_at AS VARCHAR) \
         FROM events{filter_sql} \
         ORDER BY created_at DESC"
    );
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT ?{}", params.len() + 1));
        params.push(Box::new(limit));
    }

    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            EventMeta {
                play_duration_ms: row.get(5)?,
                video_duration_ms: row.get(6)?,
                percent_watched: row.get(7)?,
                is_scrubbing: row.get(8)?,
                volume_level: row.get(9)?,
            },
            EventContext {
                network: row.get(10)?,
                device_model: row.get(11)?,
                app_version: row.get(12)?,
                locale: row.get(13)?,
            },
            row.get::<_, String>(14)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (id, event_type, user_id, video_id, session_id, meta, context, ts) = row?;
        events.push(AnalyticsEvent {
            id,
            event_type,
            user_id,
            video_id,
            session_id,
            meta,
            context,
            created_at: parse_ts(&ts)?,
        });
    }
    Ok(events)
}

pub async fn count_events(db: &DuckDbBackend, filter: &EventFilter) -> Result<i64> {
    let conn = db.conn.lock().await;
    let (filter_sql, params) = filter_clauses(filter);
    let sql = format!("SELECT COUNT(*) FROM events{filter_sql}");
    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let count: i64 = conn
        .prepare(&sql)?
        .query_row(param_refs.as_slice(), |row| row.get(0))?;
    Ok(count)
}

/// COUNT(DISTINCT user_id) — NULL user ids are ignored by DISTINCT, which is
/// exactly the DAU semantics (anonymous events do not count as a user).
pub async fn distinct_user_count(db: &DuckDbBackend, filter: &EventFilter) -> Result<i64> {
    let conn = db.conn.lock().await;
    let (filter_sql, params) = filter_clauses(filter);
    let sql = format!("SELECT COUNT(DISTINCT user_id) FROM events{filter_sql}");
    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let count: i64 = conn
        .prepare(&sql)?
        .query_row(param_refs.as_slice(), |row| row.get(0))?;
    Ok(count)
}

/// Group matching events by video, keep groups strictly above `min_count`,
/// highest count first. Drives the trending detector.
pub async fn video_view_counts(
    db: &DuckDbBackend,
    filter: &EventFilter,
    min_count: i64,
    limit: i64,
) -> Result<Vec<VideoViewCount>> {
    let conn = db.conn.lock().await;
    let (filter_sql, mut params) = filter_clauses(filter);

    let not_null = if filter_sql.is_empty() {
        " WHERE video_id IS NOT NULL"
    } else {
        " AND video_id IS NOT NULL"
    };
    let sql = format!(
        "SELECT video_id, COUNT(*) AS views \
         FROM events{filter_sql}{not_null} \
         GROUP BY video_id \
         HAVING COUNT(*) > ?{} \
         ORDER BY views DESC \
         LIMIT ?{}",
        params.len() + 1,
        params.len() + 2,
    );
    params.push(Box::new(min_count));
    params.push(Box::new(limit));

    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok(VideoViewCount {
            video_id: row.get(0)?,
            views: row.get(1)?,
        })
    })?;

    let mut counts = Vec::new();
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}

/// Mean `play_duration_ms` over matching rows; 0.0 when no row carries it.
pub async fn avg_play_duration_ms(db: &DuckDbBackend, filter: &EventFilter) -> Result<f64> {
    let conn = db.conn.lock().await;
    let (filter_sql, params) = filter_clauses(filter);
    let sql = format!("SELECT COALESCE(AVG(play_duration_ms), 0) FROM events{filter_sql}");
    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let avg: f64 = conn
        .prepare(&sql)?
        .query_row(param_refs.as_slice(), |row| row.get(0))?;
    Ok(avg)
}
