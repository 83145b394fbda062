//! # Auth Module
//!
//! Session lifecycle for the client core:
//! - Persisted credentials (token + user profile) with a
//!   session-established hook for session-scoped services
//! - REST wrapper for register/login/verify/password/profile flows

pub mod credentials;
pub mod models;
pub mod service;

#[cfg(test)]
mod tests;

pub use credentials::{CredentialStore, SessionListener};
pub use models::{AuthState, User};
pub use service::AuthService;
