//! AuxDisplay firmware library.
//!
//! Environmental display firmware: a BME280 behind an I2C register bus, a
//! 4-digit 7-segment panel behind a 74HC595 chain, and a shared status
//! snapshot for the telemetry glue. Exposes the pure-logic modules for
//! integration testing; all ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod display;
pub mod sensor;
pub mod status;
pub mod tasks;

pub mod error;
pub mod pins;
pub mod retry;

// ESPidf-backed modules; the hardware paths are cfg-guarded inside.
pub mod adapters;
pub mod drivers;
