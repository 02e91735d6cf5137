#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use testdata_buddy::config::Config;
use testdata_buddy::db::ArtifactStorage;
use testdata_buddy::{BuddyState, buddy_router, service};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "pwd";

pub struct TestApp {
    pub app: Router,
    pub storage: ArtifactStorage,
    // keeps the database file alive
    _dir: TempDir,
}

pub async fn spawn_app(cfg: Config) -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let database_url = format!("sqlite:{}", dir.path().join("buddy.sqlite").display());
    let storage = ArtifactStorage::connect(&database_url)
        .await
        .expect("failed to open database");
    let janitor = service::janitor_actor::spawn(storage.clone(), Duration::from_secs(3600))
        .await
        .expect("failed to start janitor");
    let state = BuddyState::new(storage.clone(), janitor, &cfg);
    TestApp {
        app: buddy_router(state),
        storage,
        _dir: dir,
    }
}

pub fn test_config() -> Config {
    Config {
        admin_key: ADMIN_KEY.to_string(),
        ..Config::default()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
    )
    .await;
    let status = resp.status();
    (status, body_json(resp).await)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = body_bytes(resp).await;
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}
