//! 74HC595 shift-register chain driver.
//!
//! Four daisy-chained registers, one per display digit. Bytes are
//! bit-banged MSB first, farthest register first, then latched in one
//! storage-clock pulse so the panel never shows a half-shifted frame.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real DATA/CLOCK/LATCH GPIOs.
//! On host/test: records the last latched frame in-memory.

use crate::display::DIGIT_COUNT;
use crate::drivers::hw_init;
use crate::pins;

pub struct ShiftRegisterChain {
    last_frame: [u8; DIGIT_COUNT],
}

impl Default for ShiftRegisterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ShiftRegisterChain {
    pub fn new() -> Self {
        Self {
            // All segments off (active low).
            last_frame: [0xFF; DIGIT_COUNT],
        }
    }

    /// Shift out a full frame and latch it. `frame[0]` is the leftmost
    /// digit, which sits closest to the controller, so it is shifted last.
    pub fn set_all(&mut self, frame: &[u8; DIGIT_COUNT]) {
        hw_init::gpio_write(pins::SR_LATCH_GPIO, false);
        for byte in frame.iter().rev() {
            self.shift_byte(*byte);
        }
        hw_init::gpio_write(pins::SR_LATCH_GPIO, true);
        self.last_frame = *frame;
    }

    fn shift_byte(&self, byte: u8) {
        for bit in (0..8).rev() {
            hw_init::gpio_write(pins::SR_CLOCK_GPIO, false);
            hw_init::gpio_write(pins::SR_DATA_GPIO, byte & (1 << bit) != 0);
            hw_init::gpio_write(pins::SR_CLOCK_GPIO, true);
        }
    }

    /// The most recently latched frame.
    pub fn last_frame(&self) -> [u8; DIGIT_COUNT] {
        self.last_frame
    }
}
