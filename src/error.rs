//! Unified error types for the AuxDisplay firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! task loops' error handling uniform. All variants are `Copy` so they can
//! be passed between tasks without allocation. A failed cycle logs, returns,
//! and the loop proceeds to its next iteration.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The BME280 could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// A display command could not be applied.
    Display(DisplayError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration or preferences are invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No device acknowledged at either candidate I2C address.
    NotDetected,
    /// Chip identifier register did not match the expected BME280 ID.
    ChipIdMismatch,
    /// A calibration register burst failed; initialisation aborted.
    CalibrationReadFailed,
    /// Register read returned an error or timed out (I2C NACK/timeout).
    BusReadFailed,
    /// Register write returned an error.
    BusWriteFailed,
    /// Compensated reading is outside the physically plausible range.
    OutOfRange,
    /// Acquisition requested before `init()` succeeded.
    NotInitialized,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetected => write!(f, "device not detected"),
            Self::ChipIdMismatch => write!(f, "chip ID mismatch"),
            Self::CalibrationReadFailed => write!(f, "calibration read failed"),
            Self::BusReadFailed => write!(f, "bus read failed"),
            Self::BusWriteFailed => write!(f, "bus write failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotInitialized => write!(f, "sensor not initialized"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

/// Display failures are deliberately soft: bad positions and glyphs are
/// absorbed by bounds checks inside the engine (silent no-op), so the only
/// errors that surface are mailbox overflow and dimmer write failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The command mailbox is full; the command was dropped.
    /// The producer skips this cycle and retries on its next tick.
    MailboxFull,
    /// The OE-pin PWM duty write failed.
    DimmerWriteFailed,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MailboxFull => write!(f, "command mailbox full"),
            Self::DimmerWriteFailed => write!(f, "dimmer write failed"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
