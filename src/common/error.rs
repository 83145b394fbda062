// src/common/error.rs
//
// Shared error type for the REST layer. Every failure carries a fixed,
// human-readable message; the UI presents `Display` output directly.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Check your internet connection and try again.")]
    Offline,

    #[error("You are not signed in.")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("The requested resource could not be found.")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    #[error("Server error. Please try again later.")]
    Server,

    #[error("Could not persist {0}.")]
    Persistence(&'static str),

    #[error("Something went wrong. Please try again later.")]
    Unexpected,
}

/// Error body returned by the backend. Validation failures (422) carry
/// per-field message lists under `errors`; other statuses may carry a
/// single `message`.
#[derive(Debug, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// Map a non-success HTTP response to a user-facing error. Consumes
    /// the response body; a body that fails to decode is treated as empty.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        error!(status = %status, message = ?body.message, "Request failed");
        Self::from_status(status.as_u16(), body)
    }

    /// Fixed status-code-to-message table. 400 and 422 prefer the
    /// server-provided detail when present.
    pub fn from_status(status: u16, body: ErrorBody) -> Self {
        match status {
            400 => ApiError::BadRequest(body.message.unwrap_or_else(|| {
                "Invalid request. Please check your details.".to_string()
            })),
            401 => ApiError::SessionExpired,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            422 => {
                if let Some(errors) = body.errors {
                    let joined = errors
                        .values()
                        .flatten()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("\n");
                    ApiError::Validation(joined)
                } else {
                    ApiError::Validation(body.message.unwrap_or_else(|| {
                        "Validation failed. Please check your details.".to_string()
                    }))
                }
            }
            429 => ApiError::RateLimited,
            500..=599 => ApiError::Server,
            _ => ApiError::Unexpected,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // No HTTP response at all means the network layer failed.
        if err.is_connect() || err.is_timeout() {
            ApiError::Offline
        } else {
            error!(error = %err, "Unexpected transport error");
            ApiError::Unexpected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with_errors(fields: &[(&str, &[&str])]) -> ErrorBody {
        let errors = fields
            .iter()
            .map(|(field, msgs)| {
                (
                    field.to_string(),
                    msgs.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect();
        ErrorBody {
            message: None,
            errors: Some(errors),
        }
    }

    #[test]
    fn validation_errors_are_flattened_and_joined() {
        let err = ApiError::from_status(422, body_with_errors(&[("title", &["required"])]));
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn validation_joins_multiple_fields_with_newlines() {
        let err = ApiError::from_status(
            422,
            body_with_errors(&[
                ("end_date", &["must be after start_date"]),
                ("title", &["required", "too long"]),
            ]),
        );
        let message = err.to_string();
        assert!(message.contains("required"));
        assert!(message.contains("must be after start_date"));
        assert_eq!(message.lines().count(), 3);
    }

    #[test]
    fn status_codes_map_to_fixed_messages() {
        assert!(matches!(
            ApiError::from_status(401, ErrorBody::default()),
            ApiError::SessionExpired
        ));
        assert!(matches!(
            ApiError::from_status(403, ErrorBody::default()),
            ApiError::Forbidden
        ));
        assert!(matches!(
            ApiError::from_status(404, ErrorBody::default()),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from_status(429, ErrorBody::default()),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(500, ErrorBody::default()),
            ApiError::Server
        ));
        assert!(matches!(
            ApiError::from_status(418, ErrorBody::default()),
            ApiError::Unexpected
        ));
    }

    #[test]
    fn bad_request_prefers_server_message() {
        let body = ErrorBody {
            message: Some("Email already taken".to_string()),
            errors: None,
        };
        let err = ApiError::from_status(400, body);
        assert_eq!(err.to_string(), "Email already taken");
    }
}
