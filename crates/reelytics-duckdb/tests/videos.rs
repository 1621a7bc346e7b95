use chrono::{Duration, Utc};

use reelytics_core::video::{
    CandidateQuery, ModerationStatus, Video, VideoRepository, VideoVisibility,
};
use reelytics_duckdb::DuckDbBackend;

fn video(id: &str, view_count: i64, age_days: i64) -> Video {
    Video {
        id: id.to_string(),
        user_id: "creator_1".to_string(),
        title: Some("clip".to_string()),
        description: None,
        status: "ready".to_string(),
        visibility: VideoVisibility::Public,
        moderation_status: ModerationStatus::Approved,
        duration_seconds: 30.0,
        view_count,
        like_count: 0,
        created_at: Utc::now() - Duration::days(age_days),
    }
}

#[tokio::test]
async fn insert_generates_id_when_missing() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let id = db.insert_video(&video("", 0, 0)).await.expect("insert");
    assert!(id.starts_with("vid_"));
    assert_eq!(id.len(), 14);
    let fetched = db.get(&id).await.expect("get");
    assert!(fetched.is_some());
}

#[tokio::test]
async fn get_unknown_video_returns_none() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    assert!(db.get("vid_missing").await.expect("get").is_none());
}

#[tokio::test]
async fn candidates_are_public_approved_only() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v_ok", 100, 1)).await.expect("insert");

    let mut private = video("v_private", 900, 1);
    private.visibility = VideoVisibility::Private;
    db.insert_video(&private).await.expect("insert");

    let mut pending = video("v_pending", 900, 1);
    pending.moderation_status = ModerationStatus::Pending;
    db.insert_video(&pending).await.expect("insert");

    let pool = db
        .list_candidates(&CandidateQuery::default())
        .await
        .expect("candidates");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].id, "v_ok");
}

#[tokio::test]
async fn candidates_exclude_caller_supplied_ids() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v_a", 300, 1)).await.expect("insert");
    db.insert_video(&video("v_b", 200, 1)).await.expect("insert");
    db.insert_video(&video("v_c", 100, 1)).await.expect("insert");

    let query = CandidateQuery {
        limit: 10,
        exclude_ids: vec!["v_a".to_string(), "v_c".to_string()],
    };
    let pool = db.list_candidates(&query).await.expect("candidates");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].id, "v_b");
}

#[tokio::test]
async fn candidates_order_by_views_then_recency() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v_old_popular", 500, 10))
        .await
        .expect("insert");
    db.insert_video(&video("v_new_popular", 500, 1))
        .await
        .expect("insert");
    db.insert_video(&video("v_most_viewed", 900, 20))
        .await
        .expect("insert");

    let pool = db
        .list_candidates(&CandidateQuery::default())
        .await
        .expect("candidates");
    let ids: Vec<&str> = pool.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v_most_viewed", "v_new_popular", "v_old_popular"]);
}

#[tokio::test]
async fn candidates_truncate_to_limit() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    for i in 0..5 {
        db.insert_video(&video(&format!("v{i}"), i, 1))
            .await
            .expect("insert");
    }
    let query = CandidateQuery {
        limit: 3,
        exclude_ids: Vec::new(),
    };
    assert_eq!(db.list_candidates(&query).await.expect("pool").len(), 3);
}

#[tokio::test]
async fn popular_pool_orders_by_view_count_only() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v_small", 10, 1)).await.expect("insert");
    db.insert_video(&video("v_big", 9000, 30)).await.expect("insert");

    let mut flagged = video("v_flagged", 99999, 1);
    flagged.moderation_status = ModerationStatus::Flagged;
    db.insert_video(&flagged).await.expect("insert");

    let pool = db.list_popular(10).await.expect("popular");
    let ids: Vec<&str> = pool.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v_big", "v_small"]);
}

#[tokio::test]
async fn recent_ready_skips_processing_videos() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v_ready_old", 0, 5)).await.expect("insert");
    db.insert_video(&video("v_ready_new", 0, 1)).await.expect("insert");

    let mut processing = video("v_processing", 0, 0);
    processing.status = "processing".to_string();
    db.insert_video(&processing).await.expect("insert");

    let ready = db.list_recent_ready(100).await.expect("ready");
    let ids: Vec<&str> = ready.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v_ready_new", "v_ready_old"]);
}

#[tokio::test]
async fn view_counter_increments_atomically() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v1", 0, 0)).await.expect("insert");
    db.increment_view_count("v1").await.expect("increment");
    db.increment_view_count("v1").await.expect("increment");
    let fetched = db.get("v1").await.expect("get").expect("exists");
    assert_eq!(fetched.view_count, 2);
}

#[tokio::test]
async fn like_counter_floors_at_zero() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    db.insert_video(&video("v1", 0, 0)).await.expect("insert");
    db.adjust_like_count("v1", 1).await.expect("like");
    db.adjust_like_count("v1", -1).await.expect("unlike");
    db.adjust_like_count("v1", -1).await.expect("unlike");
    let fetched = db.get("v1").await.expect("get").expect("exists");
    assert_eq!(fetched.like_count, 0);
}
