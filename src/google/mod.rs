pub mod service;

#[cfg(test)]
mod tests;

pub use service::{GoogleCalendarApi, GoogleCalendarService, SyncSummary};
