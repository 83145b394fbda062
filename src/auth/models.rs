//! Authentication data models

use serde::{Deserialize, Serialize};

/// User profile as returned by the backend. Replaced wholesale on every
/// profile update; timestamps stay as ISO-8601 wire strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Persisted session state: token plus profile. Either half may be
/// absent (e.g. profile fetched but session expired server-side).
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailData {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordData {
    pub token: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordData {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Partial profile update. Email changes usually go through a separate
/// verification flow on the backend; the field is still accepted here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfileData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response shape shared by the auth endpoints: `{ token, user }` on
/// session-establishing calls, `user` alone on profile reads, and an
/// optional informational `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}
