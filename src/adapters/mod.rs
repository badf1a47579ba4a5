//! Driven adapters — platform implementations of the port traits.
//!
//! This layer is the only place that talks to ESP-IDF services (I2C, NVS,
//! the system clock). Each adapter is dual-target where it can usefully be:
//! on the host, NVS becomes an in-memory map and the clock wraps `Instant`,
//! so the whole pipeline runs under `cargo test`.

pub mod i2c;
pub mod log_sink;
pub mod nvs;
pub mod time;

pub use i2c::HalI2cBus;
pub use log_sink::LogEventSink;
pub use nvs::NvsAdapter;
pub use time::Esp32Clock;
