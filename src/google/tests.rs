//! Tests for the Google Calendar wrapper against an in-process stub
//! backend: status-probe degradation, the auth-url envelope, and the
//! sync summary shape.

use super::service::{GoogleCalendarApi, GoogleCalendarService};
use crate::auth::CredentialStore;
use crate::config::ApiConfig;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_backend() -> String {
    let app = Router::new()
        .route(
            "/api/google/connection-status",
            get(|| async { Json(json!({ "connected": true })) }),
        )
        .route(
            "/api/google/auth-url",
            get(|| async {
                Json(json!({ "auth_url": "https://accounts.google.com/o/oauth2/auth?state=x" }))
            }),
        )
        .route(
            "/api/google/callback",
            post(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/google/events",
            get(|| async {
                Json(json!({ "events": [ { "summary": "Standup" }, { "summary": "Review" } ] }))
            }),
        )
        .route(
            "/api/google/sync-all-events",
            post(|| async {
                Json(json!({ "synced": 4, "message": "All events synced" }))
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn service_with_session(base_url: String) -> (tempfile::TempDir, GoogleCalendarService) {
    let config = ApiConfig {
        base_url,
        pusher_key: String::new(),
        pusher_cluster: "ap2".to_string(),
    };
    let dir = tempfile::tempdir().unwrap();
    let credentials = Arc::new(CredentialStore::new(dir.path().to_path_buf()));
    credentials.set_token("stub-token").await.unwrap();
    let service = GoogleCalendarService::new(&config, credentials);
    (dir, service)
}

#[tokio::test]
async fn connection_status_reports_the_backend_answer() {
    let base_url = spawn_backend().await;
    let (_dir, service) = service_with_session(base_url).await;
    assert!(service.connection_status().await);
}

#[tokio::test]
async fn status_probe_failures_read_as_not_connected() {
    // No backend listening at all.
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        pusher_key: String::new(),
        pusher_cluster: "ap2".to_string(),
    };
    let dir = tempfile::tempdir().unwrap();
    let credentials = Arc::new(CredentialStore::new(dir.path().to_path_buf()));
    credentials.set_token("stub-token").await.unwrap();
    let service = GoogleCalendarService::new(&config, credentials);
    assert!(!service.connection_status().await);

    // No session either: still false, never an error.
    let empty_dir = tempfile::tempdir().unwrap();
    let empty = Arc::new(CredentialStore::new(empty_dir.path().to_path_buf()));
    let service = GoogleCalendarService::new(&config, empty);
    assert!(!service.connection_status().await);
}

#[tokio::test]
async fn auth_url_is_unwrapped_from_the_envelope() {
    let base_url = spawn_backend().await;
    let (_dir, service) = service_with_session(base_url).await;
    let url = service.auth_url().await.unwrap();
    assert!(url.starts_with("https://accounts.google.com/"));
}

#[tokio::test]
async fn auth_code_submission_succeeds_on_2xx() {
    let base_url = spawn_backend().await;
    let (_dir, service) = service_with_session(base_url).await;
    service.submit_auth_code("4/0AX4XfWg").await.unwrap();
}

#[tokio::test]
async fn ranged_listing_unwraps_the_events_key() {
    let base_url = spawn_backend().await;
    let (_dir, service) = service_with_session(base_url).await;
    let events: Vec<Value> = service
        .list_events("2025-01-01", "2025-01-31")
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["summary"], "Standup");
}

#[tokio::test]
async fn sync_all_returns_the_summary() {
    let base_url = spawn_backend().await;
    let (_dir, service) = service_with_session(base_url).await;
    let summary = service.sync_all_events().await.unwrap();
    assert_eq!(summary.synced, Some(4));
    assert_eq!(summary.imported, None);
    assert_eq!(summary.message.as_deref(), Some("All events synced"));
}
