//! Brightness policy: preferences, the night window, and PWM duty mapping.
//!
//! Brightness lives in three unit systems that must not be confused:
//! - **stored** (1–75): what preferences persist, legacy scale.
//! - **percent** (1–100): what the policy reasons in.
//! - **duty** (245–64): the inverse PWM value on the OE pin. The chain is
//!   common anode, so a *lower* duty is *brighter*.

use serde::{Deserialize, Serialize};

/// Stored brightness bounds.
pub const STORED_MIN: u8 = 1;
pub const STORED_MAX: u8 = 75;

/// Inverse PWM duty endpoints (dimmest, brightest).
pub const DUTY_DIMMEST: u8 = 245;
pub const DUTY_BRIGHTEST: u8 = 64;

/// User-facing display preferences, persisted in NVS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPreferences {
    /// Dim the display during the night window.
    pub night_dimming_enabled: bool,
    /// Daytime brightness, stored scale (1–75).
    pub day_brightness: u8,
    /// Night-window brightness, stored scale (1–75).
    pub night_brightness: u8,
    /// Night window start hour (0–23), inclusive.
    pub night_start_hour: u8,
    /// Night window end hour (0–23), exclusive.
    pub night_end_hour: u8,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            night_dimming_enabled: false,
            day_brightness: 75,
            night_brightness: 10,
            night_start_hour: 22,
            night_end_hour: 6,
        }
    }
}

impl DisplayPreferences {
    /// Range-check every field. Used by the preferences store before
    /// persisting and after loading.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(STORED_MIN..=STORED_MAX).contains(&self.day_brightness) {
            return Err("day brightness outside 1..=75");
        }
        if !(STORED_MIN..=STORED_MAX).contains(&self.night_brightness) {
            return Err("night brightness outside 1..=75");
        }
        if self.night_start_hour > 23 {
            return Err("night start hour outside 0..=23");
        }
        if self.night_end_hour > 23 {
            return Err("night end hour outside 0..=23");
        }
        Ok(())
    }

    /// Whether `hour` falls in the night window.
    ///
    /// A window with `start < end` is contained within one day; otherwise
    /// it crosses midnight (`22 → 6` means 22:00 through 05:59).
    pub fn is_night_hour(&self, hour: u8) -> bool {
        if self.night_start_hour < self.night_end_hour {
            hour >= self.night_start_hour && hour < self.night_end_hour
        } else {
            hour >= self.night_start_hour || hour < self.night_end_hour
        }
    }

    /// Pick the brightness percentage for the given hour. With dimming
    /// disabled, or no wall clock yet, day brightness applies.
    pub fn brightness_percent(&self, hour: Option<u8>) -> u8 {
        let stored = match hour {
            Some(h) if self.night_dimming_enabled && self.is_night_hour(h) => {
                self.night_brightness
            }
            _ => self.day_brightness,
        };
        scale_stored(stored)
    }
}

/// Arduino-style `map()`: linear rescale with truncating integer division.
/// Kept bug-compatible with the classic macro, including its rounding.
fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Stored brightness (1–75) to percent (1–100).
pub fn scale_stored(stored: u8) -> u8 {
    let stored = stored.clamp(STORED_MIN, STORED_MAX);
    map_range(
        stored as i32,
        STORED_MIN as i32,
        STORED_MAX as i32,
        1,
        100,
    ) as u8
}

/// Percent (1–100) to inverse PWM duty on the OE pin.
pub fn duty_for_brightness(percent: u8) -> u8 {
    let percent = percent.clamp(1, 100);
    map_range(
        percent as i32,
        1,
        100,
        DUTY_DIMMEST as i32,
        DUTY_BRIGHTEST as i32,
    ) as u8
}
