// src/common/mod.rs
//
// Shared types used across domain modules.

pub mod error;
pub mod http;

pub use error::ApiError;

use serde::Serialize;

/// Optional start/end date filter for list endpoints, passed straight
/// through as query parameters. Ordering and pagination stay server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}
