//! Shared system status.
//!
//! A small, explicitly constructed snapshot store shared between the sensor
//! task (writer), the display task (reader/writer of the mode), and the
//! network glue (reader for telemetry, writer for the remote temperature).
//!
//! Consumers always read **by value**: the lock is held only long enough to
//! copy the snapshot in or out, so no task can starve another by holding a
//! reference into the shared state.

use std::sync::{Arc, Mutex};

use crate::display::engine::DisplayMode;
use crate::sensor::CompensatedReading;

/// Everything the rest of the system may want to know, copyable in one go.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot {
    /// Latest validated (or sentinel-invalid) reading.
    pub reading: CompensatedReading,
    /// Whether the BME280 initialised and is producing data.
    pub sensor_working: bool,
    /// Latest remote hub temperature (°C), written by the network glue.
    pub remote_temperature: f32,
    /// Mode currently shown on the display.
    pub display_mode: DisplayMode,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            reading: CompensatedReading::invalid(0),
            sensor_working: false,
            remote_temperature: 0.0,
            display_mode: DisplayMode::Time,
        }
    }
}

/// Cloneable handle to the shared snapshot.
#[derive(Clone, Default)]
pub struct SharedStatus {
    inner: Arc<Mutex<StatusSnapshot>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current snapshot out.
    pub fn snapshot(&self) -> StatusSnapshot {
        // A poisoned lock means a panicking writer; the snapshot itself is
        // still a plain-old-data copy, so recover it rather than cascade.
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Publish a new sensor reading.
    pub fn publish_reading(&self, reading: CompensatedReading) {
        self.with_mut(|s| s.reading = reading);
    }

    /// Record whether the sensor subsystem is usable.
    pub fn set_sensor_working(&self, working: bool) {
        self.with_mut(|s| s.sensor_working = working);
    }

    /// Update the remote hub temperature (called by network glue).
    pub fn set_remote_temperature(&self, celsius: f32) {
        self.with_mut(|s| s.remote_temperature = celsius);
    }

    /// Record the mode currently being rendered.
    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.with_mut(|s| s.display_mode = mode);
    }

    fn with_mut(&self, f: impl FnOnce(&mut StatusSnapshot)) {
        match self.inner.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
