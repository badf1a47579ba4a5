//! GPIO pin assignments for the AuxDisplay board.
//!
//! Single source of truth — adapters and drivers take pin numbers from here
//! rather than hard-coding them.

/// I2C SDA (BME280).
pub const I2C_SDA_GPIO: i32 = 21;
/// I2C SCL (BME280).
pub const I2C_SCL_GPIO: i32 = 22;

/// 74HC595 serial data in.
pub const SR_DATA_GPIO: i32 = 26;
/// 74HC595 shift clock.
pub const SR_CLOCK_GPIO: i32 = 32;
/// 74HC595 storage (latch) clock.
pub const SR_LATCH_GPIO: i32 = 33;
/// 74HC595 output-enable, active low. PWM-dimmed for brightness control.
pub const SR_OE_GPIO: i32 = 25;

/// OE-pin PWM frequency. High enough to be flicker-free.
pub const OE_PWM_FREQ_HZ: u32 = 1_000;
