// src/auth/credentials.rs
//
// Persisted session credentials: an opaque auth token and the serialized
// user profile, stored as two files under an application-local directory.
// This store is the single source of truth for "is a session active".

use crate::auth::models::{AuthState, User};
use crate::common::ApiError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const TOKEN_FILE: &str = "auth_token";
const USER_FILE: &str = "auth_user.json";

/// Notified when a session has just been established (both token and
/// user persisted). Establishing a session is the single trigger point
/// for starting session-scoped services such as real-time sync.
#[async_trait]
pub trait SessionListener: Send + Sync {
    async fn session_established(&self);
}

pub struct CredentialStore {
    dir: PathBuf,
    listener: RwLock<Option<Arc<dyn SessionListener>>>,
}

impl CredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            listener: RwLock::new(None),
        }
    }

    /// Store under `~/.agenda`, falling back to the working directory
    /// when no home directory can be resolved.
    pub fn with_default_dir() -> Self {
        let dir = home::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".agenda");
        Self::new(dir)
    }

    /// Register the listener invoked after a session is established.
    /// Wired once by the composition root.
    pub async fn set_session_listener(&self, listener: Arc<dyn SessionListener>) {
        *self.listener.write().await = Some(listener);
    }

    pub async fn set_token(&self, token: &str) -> Result<(), ApiError> {
        debug!("Persisting auth token");
        self.write_file(TOKEN_FILE, token.as_bytes())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to persist auth token");
                ApiError::Persistence("auth token")
            })
    }

    /// Read failures degrade to `None` ("logged out") and never propagate.
    pub async fn get_token(&self) -> Option<String> {
        match tokio::fs::read_to_string(self.dir.join(TOKEN_FILE)).await {
            Ok(token) => {
                let token = token.trim().to_string();
                (!token.is_empty()).then_some(token)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    pub async fn set_user(&self, user: &User) -> Result<(), ApiError> {
        debug!(user_id = user.id, "Persisting user profile");
        let json = serde_json::to_vec(user).map_err(|e| {
            warn!(error = %e, "Failed to serialize user profile");
            ApiError::Persistence("user profile")
        })?;
        self.write_file(USER_FILE, &json).await.map_err(|e| {
            warn!(error = %e, "Failed to persist user profile");
            ApiError::Persistence("user profile")
        })
    }

    pub async fn get_user(&self) -> Option<User> {
        match tokio::fs::read(self.dir.join(USER_FILE)).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Stored user profile is not valid JSON");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "Failed to read user profile");
                None
            }
        }
    }

    pub async fn auth_state(&self) -> AuthState {
        let (token, user) = tokio::join!(self.get_token(), self.get_user());
        AuthState { token, user }
    }

    /// Persist both halves of the session; an absent value clears the
    /// corresponding key. When both token and user are present, the
    /// registered session listener is started asynchronously.
    pub async fn set_auth_state(&self, state: AuthState) -> Result<(), ApiError> {
        match &state.token {
            Some(token) => self.set_token(token).await?,
            None => self.clear_token().await,
        }
        match &state.user {
            Some(user) => self.set_user(user).await?,
            None => self.clear_user().await,
        }

        if state.token.is_some() && state.user.is_some() {
            info!("Session established, starting session-scoped services");
            if let Some(listener) = self.listener.read().await.clone() {
                tokio::spawn(async move {
                    listener.session_established().await;
                });
            }
        }

        Ok(())
    }

    pub async fn clear_token(&self) {
        debug!("Clearing auth token");
        if let Err(e) = tokio::fs::remove_file(self.dir.join(TOKEN_FILE)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "Failed to clear auth token");
            }
        }
    }

    pub async fn clear_user(&self) {
        debug!("Clearing user profile");
        if let Err(e) = tokio::fs::remove_file(self.dir.join(USER_FILE)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "Failed to clear user profile");
            }
        }
    }

    /// Clears both keys. Used on logout and account deletion. Tearing
    /// down the push-channel subscription is the caller's responsibility.
    pub async fn clear_all(&self) {
        info!("Clearing all session credentials");
        tokio::join!(self.clear_token(), self.clear_user());
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get_token().await.is_some()
    }

    async fn write_file(&self, name: &str, contents: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), contents).await
    }
}
