//! BME280 sensor subsystem.
//!
//! Split the way the datasheet splits the problem:
//! - [`registers`] — register map, calibration constants, raw parsing.
//! - [`compensation`] — the fixed-point compensation arithmetic.
//! - [`bme280`] — the acquisition state machine driving a [`RegisterBus`].
//!
//! [`RegisterBus`]: crate::app::ports::RegisterBus

pub mod bme280;
pub mod compensation;
pub mod registers;

pub use bme280::Bme280;
pub use compensation::{INVALID_READING, TFine};
pub use registers::{CalibrationData, RawSample};

/// Physically plausible ranges; anything outside collapses the whole
/// reading to invalid.
pub const TEMP_MIN_C: f32 = -40.0;
pub const TEMP_MAX_C: f32 = 85.0;
pub const HUM_MIN_PCT: f32 = 0.0;
pub const HUM_MAX_PCT: f32 = 100.0;
pub const PRES_MIN_HPA: f32 = 300.0;
pub const PRES_MAX_HPA: f32 = 1100.0;

/// A fully compensated and validated measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    /// `false` means every field holds the [`INVALID_READING`] sentinel.
    pub valid: bool,
    /// Monotonic milliseconds at acquisition time.
    pub timestamp_ms: u64,
}

impl CompensatedReading {
    /// The sentinel reading: all fields invalid.
    pub fn invalid(timestamp_ms: u64) -> Self {
        Self {
            temperature_c: INVALID_READING,
            humidity_pct: INVALID_READING,
            pressure_hpa: INVALID_READING,
            valid: false,
            timestamp_ms,
        }
    }

    /// Range-check all three fields. Boundaries are inclusive.
    pub fn in_plausible_range(temp: f32, hum: f32, pres: f32) -> bool {
        (TEMP_MIN_C..=TEMP_MAX_C).contains(&temp)
            && (HUM_MIN_PCT..=HUM_MAX_PCT).contains(&hum)
            && (PRES_MIN_HPA..=PRES_MAX_HPA).contains(&pres)
    }
}
