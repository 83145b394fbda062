// src/lib.rs
//
// Client-side data layer for the Agenda calendar/task backend: persisted
// credentials, REST resource wrappers, a push-channel client, and the
// synchronization store that ties them together. Construct the pieces at
// the composition root and wire them explicitly; nothing here is global.

pub mod auth;
pub mod common;
pub mod config;
pub mod events;
pub mod google;
pub mod realtime;
pub mod store;
pub mod tasks;

pub use auth::{AuthService, CredentialStore, SessionListener};
pub use common::{ApiError, DateRange};
pub use config::ApiConfig;
pub use events::EventService;
pub use google::GoogleCalendarService;
pub use realtime::PusherClient;
pub use store::{CalendarStore, StoreChange};
pub use tasks::TaskService;
