use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use reelytics_core::config::Config;
use reelytics_duckdb::DuckDbBackend;
use reelytics_server::app::build_app;
use reelytics_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/reelytics-test".to_string(),
        duckdb_memory_limit: "1GB".to_string(),
        cors_origins: vec![],
        max_batch_size: 50,
    }
}

async fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

async fn ingest(app: &axum::Router, user_id: &str, events: Vec<Value>) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/events")
        .header("content-type", "application/json")
        .header("x-user-id", user_id)
        .body(Body::from(json!({ "events": events }).to_string()))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

async fn get_profile(app: &axum::Router, user_id: &str) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/users/{user_id}/profile"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn profile_for_inactive_user_is_all_zero() {
    let (_state, app) = setup().await;

    let body = get_profile(&app, "user_ghost").await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["userId"], "user_ghost");
    assert_eq!(data["videosWatched"], 0);
    assert_eq!(data["avgCompletionRate"], 0.0);
    assert_eq!(data["engagementScore"], 0.0);
    assert_eq!(data["totalWatchTimeMs"], 0.0);
    assert!(data["preferredTopics"].as_array().expect("topics").is_empty());
}

#[tokio::test]
async fn profile_reflects_the_users_activity_only() {
    let (_state, app) = setup().await;

    let mut events: Vec<Value> = (0..4)
        .map(|_| json!({ "eventType": "view_start", "videoId": "vid_a" }))
        .collect();
    events.extend((0..3).map(|_| json!({ "eventType": "view_complete", "videoId": "vid_a" })));
    events.push(json!({
        "eventType": "view_percent",
        "videoId": "vid_a",
        "meta": { "playDurationMs": 1500.0 }
    }));
    ingest(&app, "user_1", events).await;

    // Another user's traffic must not leak into user_1's profile.
    ingest(
        &app,
        "user_2",
        (0..5)
            .map(|_| json!({ "eventType": "share", "videoId": "vid_b" }))
            .collect(),
    )
    .await;

    let body = get_profile(&app, "user_1").await;
    let data = &body["data"];
    assert_eq!(data["videosWatched"], 4);
    assert_eq!(data["avgCompletionRate"], 75.0);
    assert_eq!(data["totalWatchTimeMs"], 1500.0);
    // (0*2 + 0*5 + 0*3 + 4*0.5) / 4 * 10 = 5.0
    assert_eq!(data["engagementScore"], 5.0);
}
