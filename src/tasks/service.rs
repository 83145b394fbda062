// src/tasks/service.rs
//
// REST wrapper for the tasks resource. Mirrors the events wrapper, plus
// the completion-toggle and priority convenience updates.

use crate::auth::CredentialStore;
use crate::common::http::{build_client, decode, expect_success};
use crate::common::{ApiError, DateRange};
use crate::config::{endpoints, ApiConfig};
use crate::tasks::models::{
    CreateTaskRequest, Priority, PriorityUpdateRequest, Task, TaskEnvelope,
    ToggleCompletionRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// Seam for the synchronization store; lets tests substitute a stub.
#[async_trait]
pub trait TasksApi: Send + Sync {
    async fn list_tasks(&self, range: DateRange) -> Result<Vec<Task>, ApiError>;
    async fn get_task(&self, id: i64) -> Result<Task, ApiError>;
    async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, ApiError>;
    async fn update_task(&self, id: i64, request: CreateTaskRequest) -> Result<Task, ApiError>;
    async fn delete_task(&self, id: i64) -> Result<(), ApiError>;
    async fn toggle_completion(&self, id: i64, is_completed: bool) -> Result<Task, ApiError>;
    async fn update_priority(&self, id: i64, priority: Priority) -> Result<Task, ApiError>;
}

pub struct TaskService {
    base_url: String,
    client: Client,
    credentials: Arc<CredentialStore>,
}

impl TaskService {
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            base_url: config.url(endpoints::TASKS),
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

    async fn put_task<B: serde::Serialize + Sync>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Task, ApiError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .put(format!("{}/{}", self.base_url, id))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        let envelope: TaskEnvelope = decode(response).await?;
        Ok(envelope.task)
    }
}

#[async_trait]
impl TasksApi for TaskService {
    async fn list_tasks(&self, range: DateRange) -> Result<Vec<Task>, ApiError> {
        let token = self.require_token().await?;
        debug!(start = ?range.start, end = ?range.end, "Fetching tasks");
        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(token)
            .query(&range)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_task(&self, id: i64) -> Result<Task, ApiError> {
        let token = self.require_token().await?;
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, ApiError> {
        let token = self.require_token().await?;
        debug!(title = %request.title, "Creating task");
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        let envelope: TaskEnvelope = decode(response).await?;
        Ok(envelope.task)
    }

    async fn update_task(&self, id: i64, request: CreateTaskRequest) -> Result<Task, ApiError> {
        debug!(task_id = id, "Updating task");
        self.put_task(id, &request).await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        let token = self.require_token().await?;
        debug!(task_id = id, "Deleting task");
        let response = self
            .client
            .delete(format!("{}/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn toggle_completion(&self, id: i64, is_completed: bool) -> Result<Task, ApiError> {
        debug!(task_id = id, is_completed, "Toggling task completion");
        self.put_task(id, &ToggleCompletionRequest::from_flag(is_completed))
            .await
    }

    async fn update_priority(&self, id: i64, priority: Priority) -> Result<Task, ApiError> {
        debug!(task_id = id, priority = ?priority, "Updating task priority");
        self.put_task(id, &PriorityUpdateRequest { priority }).await
    }
}
