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

async fn ingest(app: &axum::Router, events: Vec<Value>) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/events")
        .header("content-type", "application/json")
        .header("x-user-id", "user_1")
        .body(Body::from(json!({ "events": events }).to_string()))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

fn repeated(ty: &str, video_id: &str, n: usize) -> Vec<Value> {
    (0..n)
        .map(|_| json!({ "eventType": ty, "videoId": video_id }))
        .collect()
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn trending_requires_strictly_more_than_ten_view_starts() {
    let (_state, app) = setup().await;

    ingest(&app, repeated("view_start", "vid_hot", 11)).await;
    ingest(&app, repeated("view_start", "vid_borderline", 10)).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/trending")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["windowMinutes"], 15);
    let videos = body["data"]["videos"].as_array().expect("videos");
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["videoId"], "vid_hot");
    assert_eq!(videos[0]["views"], 11);
}

#[tokio::test]
async fn trending_counts_view_starts_only() {
    let (_state, app) = setup().await;

    // Heavy like traffic on one video, no view starts: not trending.
    ingest(&app, repeated("like", "vid_liked", 20)).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/trending")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let videos = body["data"]["videos"].as_array().expect("videos");
    assert!(videos.is_empty());
}
