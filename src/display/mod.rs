//! 4-digit 7-segment display subsystem.
//!
//! - [`segments`] — glyphs and the common-anode segment encoding.
//! - [`engine`] — framebuffer, mode rotation, and the value formatters.
//! - [`brightness`] — preferences, night window, and PWM duty mapping.
//! - [`commands`] — the command mailbox between producers and the display
//!   task, which is the sole owner of the engine and the shift registers.

pub mod brightness;
pub mod commands;
pub mod engine;
pub mod segments;

pub use brightness::DisplayPreferences;
pub use commands::{DisplayCommand, DisplayMailbox};
pub use engine::{DisplayEngine, DisplayMode};
pub use segments::Glyph;

/// Number of digits in the chain (one 74HC595 per digit).
pub const DIGIT_COUNT: usize = 4;
