// src/auth/service.rs
//
// REST wrapper for the auth and profile endpoints. Session-establishing
// calls (register, login, verify) persist `{token, user}` through the
// credential store, which in turn starts session-scoped services.

use crate::auth::credentials::CredentialStore;
use crate::auth::models::{
    AuthResponse, AuthState, ChangePasswordData, LoginData, RegisterData, ResetPasswordData,
    UpdateProfileData, User, VerifyEmailData,
};
use crate::common::http::{build_client, decode, expect_success};
use crate::common::ApiError;
use crate::config::{endpoints, ApiConfig};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AuthService {
    config: ApiConfig,
    client: Client,
    credentials: Arc<CredentialStore>,
}

impl AuthService {
    pub fn new(config: ApiConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            config,
            client: build_client(),
            credentials,
        }
    }

    /// Probe the backend before firing an auth request. Any HTTP response
    /// counts as reachable; only transport-level failures are offline.
    async fn ensure_online(&self) -> Result<(), ApiError> {
        match self.client.head(&self.config.base_url).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_connect() || e.is_timeout() => {
                warn!("Connectivity probe failed");
                Err(ApiError::Offline)
            }
            Err(_) => Ok(()),
        }
    }

    async fn require_token(&self) -> Result<String, ApiError> {
        self.credentials
            .get_token()
            .await
            .ok_or(ApiError::Unauthenticated)
    }

    pub async fn register(&self, data: RegisterData) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::REGISTER))
            .json(&data)
            .send()
            .await?;
        let body: AuthResponse = decode(response).await?;
        self.persist_session(&body).await?;
        Ok(body)
    }

    pub async fn login(&self, data: LoginData) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::LOGIN))
            .json(&data)
            .send()
            .await?;
        let body: AuthResponse = decode(response).await?;
        self.persist_session(&body).await?;
        Ok(body)
    }

    /// Verification returns the updated profile; the existing token is
    /// kept and the pair re-persisted.
    pub async fn verify_email(&self, data: VerifyEmailData) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::VERIFY_EMAIL))
            .json(&data)
            .send()
            .await?;
        let body: AuthResponse = decode(response).await?;
        if let Some(user) = &body.user {
            let token = self.credentials.get_token().await;
            self.credentials
                .set_auth_state(AuthState {
                    token,
                    user: Some(user.clone()),
                })
                .await?;
        }
        Ok(body)
    }

    pub async fn resend_verification(&self, email: &str) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::RESEND_VERIFICATION))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::FORGOT_PASSWORD))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn reset_password(&self, data: ResetPasswordData) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::RESET_PASSWORD))
            .json(&data)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_profile(&self, data: UpdateProfileData) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let token = self.require_token().await?;
        debug!("Sending profile update");
        let response = self
            .client
            .put(self.config.url(endpoints::USER))
            .bearer_auth(token)
            .json(&data)
            .send()
            .await?;
        let body: AuthResponse = decode(response).await?;
        if let Some(user) = &body.user {
            self.credentials.set_user(user).await?;
        }
        Ok(body)
    }

    pub async fn change_password(&self, data: ChangePasswordData) -> Result<AuthResponse, ApiError> {
        self.ensure_online().await?;
        let token = self.require_token().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::CHANGE_PASSWORD))
            .bearer_auth(token)
            .json(&data)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch the current profile from the server and re-persist it
    /// alongside the existing token.
    pub async fn fetch_user(&self) -> Result<Option<User>, ApiError> {
        self.ensure_online().await?;
        let token = self.require_token().await?;
        let response = self
            .client
            .get(self.config.url(endpoints::USER))
            .bearer_auth(token)
            .send()
            .await?;
        let body: AuthResponse = decode(response).await?;
        if let Some(user) = &body.user {
            let token = self.credentials.get_token().await;
            self.credentials
                .set_auth_state(AuthState {
                    token,
                    user: Some(user.clone()),
                })
                .await?;
        }
        Ok(body.user)
    }

    /// Ends the server-side session and clears persisted credentials.
    /// Push-channel teardown is owned by the synchronization store.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.ensure_online().await?;
        let token = self.require_token().await?;
        let response = self
            .client
            .post(self.config.url(endpoints::LOGOUT))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        expect_success(response).await?;
        self.credentials.clear_all().await;
        info!("Logged out");
        Ok(())
    }

    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.ensure_online().await?;
        let token = self.require_token().await?;
        let response = self
            .client
            .delete(self.config.url(endpoints::USER))
            .bearer_auth(token)
            .send()
            .await?;
        expect_success(response).await?;
        self.credentials.clear_all().await;
        info!("Account deleted");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated().await
    }

    async fn persist_session(&self, body: &AuthResponse) -> Result<(), ApiError> {
        if let (Some(token), Some(user)) = (&body.token, &body.user) {
            self.credentials
                .set_auth_state(AuthState {
                    token: Some(token.clone()),
                    user: Some(user.clone()),
                })
                .await?;
        }
        Ok(())
    }
}
