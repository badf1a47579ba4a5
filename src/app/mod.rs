//! Application layer: port traits and domain events.
//!
//! The domain core (sensor pipeline, display engine) only ever talks to the
//! outside world through the traits in [`ports`]; adapters implement them.

pub mod events;
pub mod ports;
