//! Hardware drivers.
//!
//! Every driver is dual-target: real register access on ESP-IDF, in-memory
//! state tracking on the host so the domain logic tests without hardware.

pub mod dimmer;
pub mod hw_init;
pub mod shift_register;
pub mod watchdog;

pub use dimmer::Dimmer;
pub use shift_register::ShiftRegisterChain;
pub use watchdog::Watchdog;
