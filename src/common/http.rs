// src/common/http.rs
//
// Small helpers shared by the REST wrappers. Every wrapper is a single
// request-response round trip; nothing here retries.

use crate::common::ApiError;
use crate::config::REQUEST_TIMEOUT_SECS;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::error;

/// Build the HTTP client shared by a service. The request timeout is the
/// only failure bound the client layer applies.
pub fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Decode a successful response body, or map the failure to a
/// user-facing error.
pub async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to decode response body");
            ApiError::Unexpected
        })
    } else {
        Err(ApiError::from_response(response).await)
    }
}

/// For calls whose success is "no error raised" (e.g. DELETE).
pub async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(ApiError::from_response(response).await)
    }
}
