//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use storybot_store::pg_content_repository::PgContentRepository;
use storybot_store::pg_save_store::PgSaveStore;
use storybot_test_support::{FixedClock, fixtures};
use tower::ServiceExt;

use storybot_api::state::AppState;

/// Build the full app router over Postgres with the fixture catalog stored
/// and a fixed clock. Uses the same router as `main.rs`.
pub async fn build_test_app(pool: PgPool) -> Router {
    let content = PgContentRepository::new(pool.clone());
    content
        .upsert_chapters(&fixtures::catalog())
        .await
        .unwrap();

    build_app_with_content(pool, content)
}

/// Build the full app router over Postgres without storing any content.
pub fn build_empty_app(pool: PgPool) -> Router {
    let content = PgContentRepository::new(pool.clone());
    build_app_with_content(pool, content)
}

fn build_app_with_content(pool: PgPool, content: PgContentRepository) -> Router {
    let state = AppState::new(
        Arc::new(FixedClock::standard()),
        Arc::new(content),
        Arc::new(PgSaveStore::new(pool)),
    );
    storybot_api::build_router(state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
