/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// `memory_limit` is passed at runtime from `Config.duckdb_memory_limit`
/// (env `REELYTICS_DUCKDB_MEMORY`, default `"1GB"`). Always set an explicit
/// limit — the DuckDB default (80% of system RAM) is not acceptable for a
/// server process. `SET threads = 2` bounds the background thread pool for
/// single-writer embedded use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- EVENTS (append-only)
-- ===========================================
-- One row per client interaction. Rows are never updated or deleted by
-- this subsystem; retention is an external concern. The optional `meta`
-- and `context` payloads are flattened into nullable columns.
CREATE TABLE IF NOT EXISTS events (
    id                  VARCHAR PRIMARY KEY,           -- uuid v4, server-assigned
    event_type          VARCHAR NOT NULL,              -- tolerant: stored verbatim
    user_id             VARCHAR,
    video_id            VARCHAR,
    session_id          VARCHAR,
    play_duration_ms    DOUBLE,
    video_duration_ms   DOUBLE,
    percent_watched     DOUBLE,
    is_scrubbing        BOOLEAN,
    volume_level        DOUBLE,
    network             VARCHAR,
    device_model        VARCHAR,
    app_version         VARCHAR,
    locale              VARCHAR,
    created_at          TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_events_user_created  ON events(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_events_video_created ON events(video_id, created_at);
CREATE INDEX IF NOT EXISTS idx_events_type_created  ON events(event_type, created_at);

-- ===========================================
-- VIDEOS (collaborator-owned records)
-- ===========================================
-- The upload/CRUD subsystem owns these rows. This subsystem reads the
-- recommendation/scoring fields and atomically bumps the two counters.
CREATE TABLE IF NOT EXISTS videos (
    id                  VARCHAR PRIMARY KEY,           -- 'vid_' + 10 hex chars when seeded
    user_id             VARCHAR NOT NULL,
    title               VARCHAR,
    description         VARCHAR,
    status              VARCHAR NOT NULL DEFAULT 'processing',
    visibility          VARCHAR NOT NULL DEFAULT 'PUBLIC',
    moderation_status   VARCHAR NOT NULL DEFAULT 'PENDING',
    duration_seconds    DOUBLE  NOT NULL DEFAULT 0,
    view_count          BIGINT  NOT NULL DEFAULT 0,
    like_count          BIGINT  NOT NULL DEFAULT 0,
    created_at          TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_videos_status_created ON videos(status, created_at);
CREATE INDEX IF NOT EXISTS idx_videos_pool           ON videos(visibility, moderation_status, view_count);
"#
    )
}
