//! Domain events emitted through the [`EventSink`](super::ports::EventSink)
//! port.

use crate::display::engine::DisplayMode;
use crate::sensor::CompensatedReading;

/// Structured events produced by the task loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// A validated reading was cached and published.
    Reading(CompensatedReading),
    /// The sensor failed to initialise or an acquisition cycle aborted.
    SensorUnavailable,
    /// The display rotated to a new mode.
    ModeChanged { from: DisplayMode, to: DisplayMode },
    /// Output intensity changed (percent, 1–100).
    BrightnessChanged(u8),
    /// New display preferences were applied.
    PreferencesUpdated,
}
