//! Tests for task models: wire encodings and the completion-toggle
//! derivation rule.

use super::models::{
    Priority, Task, TaskEnvelope, TaskStatus, ToggleCompletionRequest,
};

#[test]
fn toggle_request_derives_status_from_flag() {
    let done = ToggleCompletionRequest::from_flag(true);
    assert!(done.is_completed);
    assert_eq!(done.status, TaskStatus::Completed);

    let undone = ToggleCompletionRequest::from_flag(false);
    assert!(!undone.is_completed);
    assert_eq!(undone.status, TaskStatus::Pending);
}

#[test]
fn toggle_request_serializes_wire_shape() {
    let json = serde_json::to_value(ToggleCompletionRequest::from_flag(true)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "is_completed": true, "status": "completed" })
    );
}

#[test]
fn priority_round_trips_as_integers() {
    assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "1");
    assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "3");
    assert_eq!(
        serde_json::from_str::<Priority>("2").unwrap(),
        Priority::Medium
    );
}

#[test]
fn out_of_range_priority_is_rejected() {
    assert!(serde_json::from_str::<Priority>("0").is_err());
    assert!(serde_json::from_str::<Priority>("4").is_err());
}

#[test]
fn status_uses_hyphenated_wire_strings() {
    assert_eq!(
        serde_json::to_string(&TaskStatus::InProgress).unwrap(),
        "\"in-progress\""
    );
    assert_eq!(
        serde_json::from_str::<TaskStatus>("\"pending\"").unwrap(),
        TaskStatus::Pending
    );
}

#[test]
fn task_envelope_and_bare_list_decode() {
    let task_json = r#"{
        "id": 5,
        "user_id": 42,
        "title": "Write report",
        "due_date": "2025-01-15T17:00:00.000Z",
        "status": "in-progress",
        "priority": 2,
        "is_completed": false,
        "created_at": "2025-01-09T10:00:00.000Z",
        "updated_at": "2025-01-09T10:00:00.000Z"
    }"#;

    let envelope: TaskEnvelope =
        serde_json::from_str(&format!("{{\"task\": {task_json}}}")).unwrap();
    assert_eq!(envelope.task.id, 5);
    assert_eq!(envelope.task.priority, Priority::Medium);
    assert_eq!(envelope.task.status, TaskStatus::InProgress);

    let list: Vec<Task> = serde_json::from_str(&format!("[{task_json}]")).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].user_id, 42);
}
