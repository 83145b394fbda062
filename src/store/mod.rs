//! # Store Module
//!
//! The synchronization store: cached event/task lists, loading/error
//! state, change notification, and the push-subscription lifecycle.

pub mod calendar;


pub use calendar::{CalendarStore, StoreChange};
