//! Output-enable dimmer.
//!
//! The 74HC595 OE pin is active low, so the LEDC duty written here is
//! inverse: 245 is the dimmest visible level, 64 the brightest. The
//! percent-to-duty mapping lives in [`brightness`](crate::display::brightness);
//! this driver only pushes duty values at the hardware.

use log::debug;

use crate::display::brightness::{self, DUTY_DIMMEST};
use crate::drivers::hw_init;
use crate::error::DisplayError;

pub struct Dimmer {
    current_duty: u8,
}

impl Default for Dimmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dimmer {
    pub fn new() -> Self {
        Self {
            current_duty: DUTY_DIMMEST,
        }
    }

    /// Set brightness as a percentage (1–100).
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DisplayError> {
        self.set_duty(brightness::duty_for_brightness(percent))
    }

    /// Write a raw inverse duty value.
    pub fn set_duty(&mut self, duty: u8) -> Result<(), DisplayError> {
        if !hw_init::ledc_set(hw_init::LEDC_CH_OE, duty) {
            return Err(DisplayError::DimmerWriteFailed);
        }
        debug!("dimmer: duty {duty}");
        self.current_duty = duty;
        Ok(())
    }

    pub fn current_duty(&self) -> u8 {
        self.current_duty
    }
}
