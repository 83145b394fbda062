pub mod models;
pub mod service;


pub use models::{CalendarEvent, CreateEventRequest};
pub use service::{EventService, EventsApi};
