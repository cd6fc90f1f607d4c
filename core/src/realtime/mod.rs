//! Realtime event bus — §4.6

pub mod bus;
pub mod events;

pub use bus::RealtimeBus;
pub use events::{EventType, RealtimeEvent};
