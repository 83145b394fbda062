// src/events/service.rs
//
// REST wrapper for the events resource. Single round trip per call, no
// internal retries; retry judgment belongs to callers.

use crate::auth::CredentialStore;
use crate::common::http::{build_client, decode, expect_success};
use crate::common::{ApiError, DateRange};
use crate::config::{endpoints, ApiConfig};
use crate::events::models::{to_api_timestamp, CalendarEvent, CreateEventRequest, EventEnvelope};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// Seam for the synchronization store; lets tests substitute a stub.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn list_events(&self, range: DateRange) -> Result<Vec<CalendarEvent>, ApiError>;
    async fn get_event(&self, id: i64) -> Result<CalendarEvent, ApiError>;
    async fn create_event(&self, request: CreateEventRequest) -> Result<CalendarEvent, ApiError>;
    async fn update_event(
        &self,
        id: i64,
        request: CreateEventRequest,
    ) -> Result<CalendarEvent, ApiError>;
    async fn delete_event(&self, id: i64) -> Result<(), ApiError>;
}

pub struct EventService {
    base_url: String,
    client: Client,
    credentials: Arc<CredentialStore>,
}

impl EventService {
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            base_url: config.url(endpoints::EVENTS),
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
impl EventsApi for EventService {
    async fn list_events(&self, range: DateRange) -> Result<Vec<CalendarEvent>, ApiError> {
        let token = self.require_token().await?;
        debug!(start = ?range.start, end = ?range.end, "Fetching events");
        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(token)
            .query(&range)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_event(&self, id: i64) -> Result<CalendarEvent, ApiError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    async fn create_event(&self, request: CreateEventRequest) -> Result<CalendarEvent, ApiError> {
        let token = self.require_token().await?;
        let request = CreateEventRequest {
            start_date: to_api_timestamp(&request.start_date)?,
            end_date: to_api_timestamp(&request.end_date)?,
            ..request
        };
        debug!(title = %request.title, "Creating event");
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        let envelope: EventEnvelope = decode(response).await?;
        Ok(envelope.event)
    }

    async fn update_event(
        &self,
        id: i64,
        request: CreateEventRequest,
    ) -> Result<CalendarEvent, ApiError> {
        let token = self.require_token().await?;
        debug!(event_id = id, "Updating event");
        let response = self
            .client
            .put(format!("{}/{}", self.base_url, id))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        let envelope: EventEnvelope = decode(response).await?;
        Ok(envelope.event)
    }

    async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        let token = self.require_token().await?;
        debug!(event_id = id, "Deleting event");
        let response = self
            .client
            .delete(format!("{}/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        expect_success(response).await
    }
}
