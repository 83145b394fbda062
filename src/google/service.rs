// src/google/service.rs
//
// Wrapper for the backend-proxied Google Calendar integration. OAuth
// token custody lives server-side; this client only drives the flow and
// triggers imports/syncs.

use crate::auth::CredentialStore;
use crate::common::http::{build_client, decode, expect_success};
use crate::common::ApiError;
use crate::config::{endpoints, ApiConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct ConnectionStatusResponse {
    connected: bool,
}

#[derive(Debug, Deserialize)]
struct AuthUrlResponse {
    auth_url: String,
}

/// Summary returned by bulk import/sync calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncSummary {
    #[serde(default)]
    pub imported: Option<i64>,
    #[serde(default)]
    pub synced: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait GoogleCalendarApi: Send + Sync {
    async fn connection_status(&self) -> bool;
    async fn auth_url(&self) -> Result<String, ApiError>;
    async fn submit_auth_code(&self, code: &str) -> Result<(), ApiError>;
    async fn disconnect(&self) -> Result<(), ApiError>;
    async fn list_events(&self, start: &str, end: &str)
        -> Result<Vec<serde_json::Value>, ApiError>;
    async fn import_events(&self, start: &str, end: &str) -> Result<SyncSummary, ApiError>;
    async fn sync_event(&self, event_id: i64) -> Result<(), ApiError>;
    async fn sync_all_events(&self) -> Result<SyncSummary, ApiError>;
}

pub struct GoogleCalendarService {
    base_url: String,
    client: Client,
    credentials: Arc<CredentialStore>,
}

impl GoogleCalendarService {
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            base_url: config.url(endpoints::GOOGLE),
            client: build_client(),
            credentials,
        }
    }

    async fn require_token(&self) -> Result<String, ApiError> {
        self.credentials
            .get_token()
            .await
            .ok_or(ApiError::Unauthenticated)
    }
}

#[async_trait]
impl GoogleCalendarApi for GoogleCalendarService {
    /// A failed status check reads as "not connected" rather than an
    /// error; the settings screen treats the two the same way.
    async fn connection_status(&self) -> bool {
        let result: Result<ConnectionStatusResponse, ApiError> = async {
            let token = self.require_token().await?;
            let response = self
                .client
                .get(format!("{}/connection-status", self.base_url))
                .bearer_auth(token)
                .send()
                .await?;
            decode(response).await
        }
        .await;

        match result {
            Ok(status) => status.connected,
            Err(e) => {
                warn!(error = %e, "Google connection status check failed");
                false
            }
        }
    }

    async fn auth_url(&self) -> Result<String, ApiError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .get(format!("{}/auth-url", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let body: AuthUrlResponse = decode(response).await?;
        Ok(body.auth_url)
    }

    async fn submit_auth_code(&self, code: &str) -> Result<(), ApiError> {
        let token = self.require_token().await?;
        debug!("Submitting Google authorization code");
        let response = self
            .client
            .post(format!("{}/callback", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "code": code }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn disconnect(&self) -> Result<(), ApiError> {
        let token = self.require_token().await?;
        info!("Disconnecting Google Calendar");
        let response = self
            .client
            .post(format!("{}/disconnect", self.base_url))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn list_events(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        #[derive(Deserialize)]
        struct EventsResponse {
            events: Vec<serde_json::Value>,
        }

        let token = self.require_token().await?;
        let response = self
            .client
            .get(format!("{}/events", self.base_url))
            .bearer_auth(token)
            .query(&[("start_date", start), ("end_date", end)])
            .send()
            .await?;
        let body: EventsResponse = decode(response).await?;
        Ok(body.events)
    }

    async fn import_events(&self, start: &str, end: &str) -> Result<SyncSummary, ApiError> {
        let token = self.require_token().await?;
        info!(start, end, "Importing Google Calendar events");
        let response = self
            .client
            .post(format!("{}/import-events", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "start_date": start, "end_date": end }))
            .send()
            .await?;
        decode(response).await
    }

    async fn sync_event(&self, event_id: i64) -> Result<(), ApiError> {
        let token = self.require_token().await?;
        debug!(event_id, "Syncing event to Google Calendar");
        let response = self
            .client
            .post(format!("{}/sync-event", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "event_id": event_id }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn sync_all_events(&self) -> Result<SyncSummary, ApiError> {
        let token = self.require_token().await?;
        info!("Syncing all events to Google Calendar");
        let response = self
            .client
            .post(format!("{}/sync-all-events", self.base_url))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        decode(response).await
    }
}
