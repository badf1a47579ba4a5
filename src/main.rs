//! AuxDisplay Firmware — Main Entry Point
//!
//! Two long-lived tasks around a shared status snapshot:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HalI2cBus      NvsAdapter      Esp32Clock    LogEventSink   │
//! │  (RegisterBus)  (Preferences)   (Clock)       (EventSink)    │
//! │                                                              │
//! │  ────────────── Port Trait Boundary ───────────────────      │
//! │                                                              │
//! │  sensor task ──▶ Bme280 ──▶ SharedStatus ◀── display task    │
//! │                                 ▲                            │
//! │                     telemetry glue (remote temp)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The display task owns the engine, the 74HC595 chain, and the dimmer;
//! everyone else reaches it through the command mailbox.

#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod app;
pub mod config;
mod display;
mod error;
mod pins;
mod retry;
mod sensor;
mod status;
mod tasks;

mod adapters;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use log::{info, warn};

use adapters::i2c::HalI2cBus;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsAdapter;
use adapters::time::Esp32Clock;
use app::ports::{Clock, PreferencesStore};
use config::SystemConfig;
use display::brightness::DisplayPreferences;
use display::commands::{DisplayCommand, DisplayMailbox};
use drivers::watchdog::Watchdog;
use drivers::{Dimmer, ShiftRegisterChain};
use sensor::Bme280;
use status::SharedStatus;
use tasks::{run_sensor_cycle, DisplayTask};

const DISPLAY_MAILBOX_DEPTH: usize = 8;
const DISPLAY_TASK_STACK: usize = 8 * 1024;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AuxDisplay v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(400.kHz().into()),
    )?;
    let bus = HalI2cBus::new(i2c, FreeRtos);

    // ── 3. Preferences from NVS (or defaults) ─────────────────
    let prefs = match NvsAdapter::new() {
        Ok(nvs) => match nvs.load() {
            Ok(p) => {
                info!("Display preferences loaded from NVS");
                p
            }
            Err(e) => {
                warn!("Preferences load failed ({}), using defaults", e);
                DisplayPreferences::default()
            }
        },
        Err(e) => {
            warn!(
                "NVS init failed ({}), running with defaults and no persistence",
                e
            );
            DisplayPreferences::default()
        }
    };

    // ── 4. Shared state and the display task ──────────────────
    let config = SystemConfig::default();
    let status = SharedStatus::new();
    let (mailbox, commands) = DisplayMailbox::bounded(DISPLAY_MAILBOX_DEPTH);

    // Boot-time lamp test before the rotation starts.
    if mailbox.send(DisplayCommand::LampTest).is_err() {
        warn!("display mailbox full at boot");
    }

    {
        let config = config.clone();
        let status = status.clone();
        std::thread::Builder::new()
            .name("display".into())
            .stack_size(DISPLAY_TASK_STACK)
            .spawn(move || {
                let tick_ms = config.display_tick_ms;
                let mut task = DisplayTask::new(
                    config,
                    ShiftRegisterChain::new(),
                    Dimmer::new(),
                    commands,
                    status,
                    Esp32Clock::new(),
                    Watchdog::new(),
                    LogEventSink,
                    prefs,
                    FreeRtos::delay_ms,
                );
                loop {
                    task.tick();
                    FreeRtos::delay_ms(tick_ms);
                }
            })?;
    }

    // ── 5. Sensor loop on the main task ───────────────────────
    let clock = Esp32Clock::new();
    let watchdog = Watchdog::new();
    let mut events = LogEventSink;
    let mut bme280 = Bme280::new(bus, config.measurement_settle_ms);

    loop {
        run_sensor_cycle(
            &mut bme280,
            &status,
            &watchdog,
            &mut events,
            clock.now_millis(),
        );
        FreeRtos::delay_ms(config.sensor_read_interval_ms);
    }
}
