//! System configuration parameters
//!
//! All tunable parameters for the AuxDisplay firmware: display mode dwell
//! durations, refresh cadences, and sensor acquisition timing.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Display mode dwell durations ---
    /// How long the TIME mode stays on screen (milliseconds)
    pub time_dwell_ms: u32,
    /// How long the DATE mode stays on screen (milliseconds)
    pub date_dwell_ms: u32,
    /// How long the TEMPERATURE mode stays on screen (milliseconds)
    pub temperature_dwell_ms: u32,
    /// How long the HUMIDITY mode stays on screen (milliseconds)
    pub humidity_dwell_ms: u32,
    /// How long the PRESSURE mode stays on screen (milliseconds)
    pub pressure_dwell_ms: u32,
    /// How long the REMOTE_TEMPERATURE mode stays on screen (milliseconds)
    pub remote_dwell_ms: u32,

    // --- Display refresh ---
    /// Shift-register flush interval (milliseconds)
    pub display_refresh_ms: u32,
    /// Display task tick period (milliseconds)
    pub display_tick_ms: u32,
    /// Colon blink half-period in TIME mode (milliseconds)
    pub colon_blink_ms: u32,

    // --- Sensor timing ---
    /// BME280 acquisition interval (milliseconds)
    pub sensor_read_interval_ms: u32,
    /// Settle delay after triggering a forced measurement (milliseconds)
    pub measurement_settle_ms: u32,

    // --- Remote sensor ---
    /// Remote temperature poll interval (seconds); the fetch itself is
    /// network glue, this only paces the REMOTE_TEMPERATURE refresh.
    pub remote_poll_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Dwell durations
            time_dwell_ms: 8000,
            date_dwell_ms: 2000,
            temperature_dwell_ms: 2000,
            humidity_dwell_ms: 2000,
            pressure_dwell_ms: 2000,
            remote_dwell_ms: 3000,

            // Refresh
            display_refresh_ms: 100,
            display_tick_ms: 100, // 10 Hz
            colon_blink_ms: 500,  // 2 Hz blink

            // Sensor
            sensor_read_interval_ms: 2000, // 0.5 Hz measurement rate
            measurement_settle_ms: 10,

            // Remote
            remote_poll_interval_secs: 30,
        }
    }
}
