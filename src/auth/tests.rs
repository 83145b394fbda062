//! Tests for the credential store contract:
//! - token and user round-trip through persistence
//! - read failures degrade to "logged out" instead of propagating
//! - set_auth_state clears absent halves and fires the session hook

use super::credentials::{CredentialStore, SessionListener};
use super::models::{AuthState, User};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn sample_user(id: i64) -> User {
    User {
        id,
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        email_verified_at: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

struct CountingListener {
    established: AtomicUsize,
}

#[async_trait]
impl SessionListener for CountingListener {
    async fn session_established(&self) {
        self.established.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn token_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());

    assert_eq!(store.get_token().await, None);
    assert!(!store.is_authenticated().await);

    store.set_token("abc123").await.unwrap();
    assert_eq!(store.get_token().await, Some("abc123".to_string()));
    assert!(store.is_authenticated().await);

    store.clear_token().await;
    assert_eq!(store.get_token().await, None);
}

#[tokio::test]
async fn user_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());

    assert_eq!(store.get_user().await, None);
    store.set_user(&sample_user(42)).await.unwrap();
    assert_eq!(store.get_user().await, Some(sample_user(42)));

    store.clear_user().await;
    assert_eq!(store.get_user().await, None);
}

#[tokio::test]
async fn corrupt_user_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("auth_user.json"), b"not json")
        .await
        .unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());
    assert_eq!(store.get_user().await, None);
}

#[tokio::test]
async fn set_auth_state_clears_absent_halves() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());

    store.set_token("tok").await.unwrap();
    store.set_user(&sample_user(1)).await.unwrap();

    store
        .set_auth_state(AuthState {
            token: None,
            user: Some(sample_user(1)),
        })
        .await
        .unwrap();

    let state = store.auth_state().await;
    assert_eq!(state.token, None);
    assert_eq!(state.user, Some(sample_user(1)));
}

#[tokio::test]
async fn session_listener_fires_only_for_complete_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());
    let listener = Arc::new(CountingListener {
        established: AtomicUsize::new(0),
    });
    store.set_session_listener(listener.clone()).await;

    // Token alone does not establish a session.
    store
        .set_auth_state(AuthState {
            token: Some("tok".to_string()),
            user: None,
        })
        .await
        .unwrap();

    store
        .set_auth_state(AuthState {
            token: Some("tok".to_string()),
            user: Some(sample_user(7)),
        })
        .await
        .unwrap();

    // The hook runs on a spawned task; give it a moment.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(listener.established.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clear_all_removes_both_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());
    store.set_token("tok").await.unwrap();
    store.set_user(&sample_user(1)).await.unwrap();

    store.clear_all().await;
    assert_eq!(store.get_token().await, None);
    assert_eq!(store.get_user().await, None);
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn unreadable_store_treated_as_logged_out() {
    // Point at a path that cannot exist as a directory.
    let store = CredentialStore::new(PathBuf::from("/dev/null/nope"));
    assert_eq!(store.get_token().await, None);
    assert_eq!(store.get_user().await, None);
    assert!(!store.is_authenticated().await);
}
