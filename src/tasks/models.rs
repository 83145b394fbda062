//! Task data models

use serde::{Deserialize, Serialize};

/// Task workflow state. Wire values match the backend's strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

/// Priority levels, serialized as the backend's 1/2/3 integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("invalid priority: {other}")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        match priority {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<i64>>,
}

/// Create/update responses wrap the entity under a `task` key.
#[derive(Debug, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}

/// Payload for the completion toggle. `status` is always derived from
/// the boolean (completed iff done, pending otherwise); this rule is
/// fixed, not configurable.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleCompletionRequest {
    pub is_completed: bool,
    pub status: TaskStatus,
}

impl ToggleCompletionRequest {
    pub fn from_flag(is_completed: bool) -> Self {
        Self {
            is_completed,
            status: if is_completed {
                TaskStatus::Completed
            } else {
                TaskStatus::Pending
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityUpdateRequest {
    pub priority: Priority,
}
