//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ domain core (sensor pipeline / display engine)
//! ```
//!
//! Driven adapters (I2C bus, clock, watchdog, NVS, event sinks) implement
//! these traits. The domain consumes them via generics, so the sensor and
//! display code never touches hardware directly and runs unmodified under
//! the host-target test suite.

use crate::display::brightness::DisplayPreferences;

// ───────────────────────────────────────────────────────────────
// Register transport (driven adapter: I2C hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Byte-level register access against an addressed I2C device.
///
/// All errors are squashed to [`BusError`]; the caller decides whether a
/// failure is fatal (boot-time detection) or retry-next-cycle (acquisition).
pub trait RegisterBus {
    /// Address-only probe: does any device ACK at `addr`?
    fn probe(&mut self, addr: u8) -> Result<(), BusError>;

    /// Burst-read `buf.len()` bytes starting at register `reg`.
    fn read(&mut self, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `data` starting at register `reg`.
    fn write(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), BusError>;

    /// Blocking delay. Lives on the bus because measurement settle times
    /// are part of the transport contract, mirroring the vendor driver.
    fn delay_ms(&mut self, ms: u32);
}

/// Transport-level failure (NACK, timeout, arbitration loss).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Device did not acknowledge.
    Nack,
    /// Transfer timed out.
    Timeout,
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Nack => write!(f, "NACK"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: platform time → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock fields needed by the TIME and DATE display modes and the
/// night-mode brightness policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
    pub day: u8,
    pub month: u8,
}

/// Monotonic and wall-clock time source.
pub trait Clock {
    /// Milliseconds since boot (monotonic).
    fn now_millis(&self) -> u64;

    /// Local wall-clock time, or `None` until NTP has synced.
    fn wall_clock(&self) -> Option<WallClock>;
}

// ───────────────────────────────────────────────────────────────
// Watchdog (domain → platform liveness)
// ───────────────────────────────────────────────────────────────

/// Liveness heartbeat. The acquisition and display loops call this every
/// iteration; a stalled loop triggers a system-level reset.
pub trait WatchdogPort {
    fn heartbeat(&self);
}

// ───────────────────────────────────────────────────────────────
// Preferences store (domain ↔ persistent storage)
// ───────────────────────────────────────────────────────────────

/// Loads and persists display preferences.
///
/// Implementations MUST validate before persisting: brightness values
/// outside 1..=75 or hours outside 0..=23 are rejected with
/// [`PrefsError::ValidationFailed`], not silently clamped.
pub trait PreferencesStore {
    /// Load preferences. Returns [`DisplayPreferences::default()`] when no
    /// stored blob exists.
    fn load(&self) -> Result<DisplayPreferences, PrefsError>;

    /// Validate and persist preferences.
    fn save(&self, prefs: &DisplayPreferences) -> Result<(), PrefsError>;
}

/// Errors from [`PreferencesStore`] operations.
#[derive(Debug)]
pub enum PrefsError {
    /// No preferences found in storage (first boot).
    NotFound,
    /// Stored blob failed deserialization.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "preferences not found"),
            Self::Corrupted => write!(f, "preferences corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, MQTT
/// publisher, HTTP status cache).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
