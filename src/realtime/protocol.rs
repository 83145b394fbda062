// src/realtime/protocol.rs
//
// Wire frames for the pub/sub service (Pusher channels protocol 7).
// Incoming `data` is usually a JSON document re-encoded as a string;
// `nested_data` unwraps that.

use serde::Deserialize;
use serde_json::{json, Value};

/// The only application event this client acts on. Everything else on
/// the channel is received and ignored.
pub const UPDATE_EVENT: &str = "calendar-update";

pub const CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
pub const SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
pub const PING: &str = "pusher:ping";
pub const ERROR: &str = "pusher:error";

/// Per-user channel name. Subscription only happens after a session is
/// established, so the user id is always known by then.
pub fn channel_for_user(user_id: i64) -> String {
    format!("calendar-{user_id}")
}

pub fn connection_url(key: &str, cluster: &str) -> String {
    format!("wss://ws-{cluster}.pusher.com:443/app/{key}?protocol=7&client=agenda-client&version=0.1.0")
}

/// A frame received from the broker.
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn parse(text: &str) -> Option<Frame> {
        serde_json::from_str(text).ok()
    }
}

/// Unwrap the broker's string-encoded `data` payload.
pub fn nested_data(data: &Value) -> Value {
    match data {
        Value::String(s) => serde_json::from_str(s).unwrap_or(Value::Null),
        other => other.clone(),
    }
}

pub fn subscribe_frame(channel: &str) -> String {
    json!({ "event": "pusher:subscribe", "data": { "channel": channel } }).to_string()
}

pub fn unsubscribe_frame(channel: &str) -> String {
    json!({ "event": "pusher:unsubscribe", "data": { "channel": channel } }).to_string()
}

pub fn pong_frame() -> String {
    json!({ "event": "pusher:pong", "data": {} }).to_string()
}
