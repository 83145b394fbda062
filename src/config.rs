// src/config.rs
//
// Runtime configuration for the client core. Values come from the
// environment (loaded via dotenv by the binary); defaults point at a
// local development backend.

use std::env;

/// Default request timeout applied to every REST call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Backend API endpoints, relative to the base URL.
pub mod endpoints {
    pub const REGISTER: &str = "/api/register";
    pub const LOGIN: &str = "/api/login";
    pub const VERIFY_EMAIL: &str = "/api/verify-email";
    pub const RESEND_VERIFICATION: &str = "/api/resend-verification";
    pub const FORGOT_PASSWORD: &str = "/api/forgot-password";
    pub const RESET_PASSWORD: &str = "/api/reset-password";
    pub const CHANGE_PASSWORD: &str = "/api/change-password";
    pub const LOGOUT: &str = "/api/logout";
    pub const USER: &str = "/api/user";
    pub const EVENTS: &str = "/api/events";
    pub const TASKS: &str = "/api/tasks";
    pub const GOOGLE: &str = "/api/google";
}

/// Configuration shared by every service in the composition root.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub pusher_key: String,
    pub pusher_cluster: String,
}

impl ApiConfig {
    /// Build configuration from environment variables, falling back to
    /// local development defaults.
    pub fn from_env() -> Self {
        let base_url = env::var("AGENDA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let pusher_key = env::var("PUSHER_KEY").unwrap_or_default();
        let pusher_cluster = env::var("PUSHER_CLUSTER").unwrap_or_else(|_| "ap2".to_string());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            pusher_key,
            pusher_cluster,
        }
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}
