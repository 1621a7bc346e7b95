use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use reelytics_core::event::AnalyticsEvent;

use crate::schema::init_sql;

/// Generate a cryptographically random hex string of `n` bytes (2n hex chars).
pub(crate) fn rand_hex(n: usize) -> String {
    use rand::RngCore;
    let mut buf = vec![0u8; n];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// A DuckDB backend for Reelytics.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent writes
/// cause contention. We wrap the connection in `Arc<Mutex<_>>` so the async
/// runtime serialises all writes while the struct stays cheap to clone and
/// share across Axum handlers and scheduler jobs. The events table is
/// append-only, so a reader holding the lock only ever sees a prefix of
/// committed rows.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`,
    /// read from `Config.duckdb_memory_limit` at the call site. Runs the
    /// schema init SQL so all tables and indexes exist.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests only — data is discarded when the struct is
    /// dropped. Uses a 1GB memory limit (tests are not memory-constrained).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Cheap liveness probe: runs `SELECT 1` on the connection.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        let one: i64 = conn.prepare("SELECT 1")?.query_row([], |row| row.get(0))?;
        anyhow::ensure!(one == 1, "unexpected ping result");
        Ok(())
    }

    /// Append a batch of events.
    ///
    /// Returns the number of rows written (the accepted count the ingest
    /// endpoint reports back). Returns 0 immediately if `events` is empty.
    pub async fn insert_events(&self, events: &[AnalyticsEvent]) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;

        // One transaction for the whole batch: atomic, and one fsync
        // instead of N.
        let tx = conn.transaction()?;

        for event in events {
            tx.execute(
                r#"INSERT INTO events (
                    id, event_type, user_id, video_id, session_id,
                    play_duration_ms, video_duration_ms, percent_watched,
                    is_scrubbing, volume_level,
                    network, device_model, app_version, locale,
                    created_at
                ) VALUES (
                    ?1,  ?2,  ?3,  ?4,  ?5,
                    ?6,  ?7,  ?8,
                    ?9,  ?10,
                    ?11, ?12, ?13, ?14,
                    ?15
                )"#,
                duckdb::params![
                    event.id,
                    event.event_type,
                    event.user_id,
                    event.video_id,
                    event.session_id,
                    event.meta.play_duration_ms,
                    event.meta.video_duration_ms,
                    event.meta.percent_watched,
                    event.meta.is_scrubbing,
                    event.meta.volume_level,
                    event.context.network,
                    event.context.device_model,
                    event.context.app_version,
                    event.context.locale,
                    event.created_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        tracing::debug!("Inserted {} events into DuckDB", events.len());
        Ok(events.len())
    }
}
