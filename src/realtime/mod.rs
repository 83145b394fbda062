//! # Realtime Module
//!
//! Push-channel client for the pub/sub broker. One connection, one
//! channel subscription (`calendar-<userId>`) at a time; delivers
//! `calendar-update` signals to the synchronization store.

pub mod client;
pub mod protocol;


pub use client::{PushChannel, PushError, PusherClient, UpdateCallback};
