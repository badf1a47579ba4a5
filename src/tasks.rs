//! Task bodies for the sensor and display loops.
//!
//! The loops themselves (thread spawn, sleep cadence) live in `main.rs`;
//! everything here is a plain function or struct driven by explicit time,
//! so the whole behaviour runs under the host test suite.

use std::sync::mpsc::Receiver;

use log::{debug, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, RegisterBus, WatchdogPort};
use crate::config::SystemConfig;
use crate::display::brightness::DisplayPreferences;
use crate::display::commands::DisplayCommand;
use crate::display::engine::{DisplayEngine, DisplayMode};
use crate::drivers::{Dimmer, ShiftRegisterChain};
use crate::error::SensorError;
use crate::sensor::Bme280;
use crate::status::SharedStatus;

// ───────────────────────────────────────────────────────────────
// Sensor task
// ───────────────────────────────────────────────────────────────

/// One iteration of the sensor loop.
///
/// Re-attempts initialisation whenever the sensor is not up, so a flaky
/// boot (or a reseated module) recovers without a reboot. A transport
/// failure mid-cycle keeps the previously published reading.
pub fn run_sensor_cycle<B, W, E>(
    sensor: &mut Bme280<B>,
    status: &SharedStatus,
    watchdog: &W,
    events: &mut E,
    now_ms: u64,
) where
    B: RegisterBus,
    W: WatchdogPort,
    E: EventSink,
{
    watchdog.heartbeat();

    if !sensor.is_working() {
        if let Err(e) = sensor.init() {
            warn!("sensor task: init failed: {e}");
            status.set_sensor_working(false);
            events.emit(&AppEvent::SensorUnavailable);
            return;
        }
        status.set_sensor_working(true);
    }

    match sensor.acquire(now_ms) {
        Ok(reading) => {
            status.publish_reading(reading);
            events.emit(&AppEvent::Reading(reading));
        }
        Err(SensorError::OutOfRange) => {
            // The driver cached the sentinel; publish it so the display
            // blanks instead of showing a stale value forever.
            if let Some(reading) = sensor.last_reading() {
                status.publish_reading(reading);
            }
        }
        Err(e) => {
            // Transient bus trouble: keep the published reading as-is.
            warn!("sensor task: acquisition failed: {e}");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Display task
// ───────────────────────────────────────────────────────────────

/// The display task state. Sole owner of the engine, the shift-register
/// chain, and the dimmer; everyone else goes through the command mailbox
/// or the shared status.
pub struct DisplayTask<C, W, E, S>
where
    C: Clock,
    W: WatchdogPort,
    E: EventSink,
    S: Fn(u32),
{
    engine: DisplayEngine,
    chain: ShiftRegisterChain,
    dimmer: Dimmer,
    commands: Receiver<DisplayCommand>,
    status: SharedStatus,
    clock: C,
    watchdog: W,
    events: E,
    prefs: DisplayPreferences,
    /// Manual override from a `SetBrightness` command; cleared when new
    /// preferences arrive.
    manual_percent: Option<u8>,
    applied_percent: Option<u8>,
    sleep: S,
}

impl<C, W, E, S> DisplayTask<C, W, E, S>
where
    C: Clock,
    W: WatchdogPort,
    E: EventSink,
    S: Fn(u32),
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SystemConfig,
        chain: ShiftRegisterChain,
        dimmer: Dimmer,
        commands: Receiver<DisplayCommand>,
        status: SharedStatus,
        clock: C,
        watchdog: W,
        events: E,
        prefs: DisplayPreferences,
        sleep: S,
    ) -> Self {
        let now = clock.now_millis();
        Self {
            engine: DisplayEngine::new(config, now),
            chain,
            dimmer,
            commands,
            status,
            clock,
            watchdog,
            events,
            prefs,
            manual_percent: None,
            applied_percent: None,
            sleep,
        }
    }

    /// One iteration of the display loop: drain commands, rotate modes,
    /// render the current mode from shared state, apply brightness, flush.
    pub fn tick(&mut self) {
        self.watchdog.heartbeat();
        let now = self.clock.now_millis();

        let pending: Vec<DisplayCommand> = self.commands.try_iter().collect();
        for command in pending {
            self.handle_command(command, now);
        }

        self.engine.tick_colon(now);
        if let Some((from, to)) = self.engine.maybe_advance(now) {
            self.status.set_display_mode(to);
            self.events.emit(&AppEvent::ModeChanged { from, to });
        }

        self.render_current_mode();
        self.apply_brightness_policy();

        if self.engine.should_flush(now) {
            self.chain.set_all(&self.engine.render());
        }
    }

    fn handle_command(&mut self, command: DisplayCommand, now: u64) {
        match command {
            DisplayCommand::SetMode(mode) => {
                self.engine.set_mode(mode, now);
                self.status.set_display_mode(mode);
            }
            DisplayCommand::SetBrightness(percent) => {
                self.manual_percent = Some(percent);
            }
            DisplayCommand::ApplyPreferences(prefs) => {
                self.prefs = prefs;
                self.manual_percent = None;
                self.events.emit(&AppEvent::PreferencesUpdated);
            }
            DisplayCommand::Clear => self.engine.clear(),
            DisplayCommand::LampTest => self.lamp_test(),
        }
    }

    /// Paint the framebuffer for the current mode from shared state.
    ///
    /// TIME and DATE blank until the wall clock has synced; sensor modes
    /// blank while the reading is invalid.
    fn render_current_mode(&mut self) {
        let snapshot = self.status.snapshot();
        let wall = self.clock.wall_clock();

        match self.engine.mode() {
            DisplayMode::Time => match wall {
                Some(w) => self.engine.show_time(w),
                None => self.engine.clear(),
            },
            DisplayMode::Date => match wall {
                Some(w) => self.engine.show_date(w),
                None => self.engine.clear(),
            },
            DisplayMode::Temperature => {
                if snapshot.reading.valid {
                    self.engine.show_temperature(snapshot.reading.temperature_c);
                } else {
                    self.engine.clear();
                }
            }
            DisplayMode::Humidity => {
                if snapshot.reading.valid {
                    self.engine.show_humidity(snapshot.reading.humidity_pct);
                } else {
                    self.engine.clear();
                }
            }
            DisplayMode::Pressure => {
                if snapshot.reading.valid {
                    self.engine.show_pressure(snapshot.reading.pressure_hpa);
                } else {
                    self.engine.clear();
                }
            }
            DisplayMode::RemoteTemperature => {
                self.engine.show_remote_temperature(snapshot.remote_temperature);
            }
        }
    }

    /// Pick the target brightness (manual override, else the night-window
    /// policy) and push it to the dimmer when it changes.
    fn apply_brightness_policy(&mut self) {
        let hour = self.clock.wall_clock().map(|w| w.hour);
        let percent = self
            .manual_percent
            .unwrap_or_else(|| self.prefs.brightness_percent(hour));

        if self.applied_percent == Some(percent) {
            return;
        }
        match self.dimmer.set_brightness(percent) {
            Ok(()) => {
                self.applied_percent = Some(percent);
                self.events.emit(&AppEvent::BrightnessChanged(percent));
            }
            Err(e) => warn!("display task: {e}"),
        }
    }

    /// Boot-time lamp test: counts 0–9 on all digits while sweeping the
    /// brightness, then blanks. Blocks the display task for ~5 s.
    fn lamp_test(&mut self) {
        debug!("display task: lamp test");
        for digit in 0..=9u8 {
            for pos in 0..crate::display::DIGIT_COUNT {
                self.engine
                    .set_digit(pos, crate::display::Glyph::digit(digit), false);
            }
            if self.dimmer.set_brightness(25 * digit).is_err() {
                warn!("display task: dimmer write failed during lamp test");
            }
            self.chain.set_all(&self.engine.render());
            (self.sleep)(500);
        }
        self.engine.clear();
        self.chain.set_all(&self.engine.render());
        // Force the policy to re-apply its brightness.
        self.applied_percent = None;
    }

    /// The last frame pushed to the shift registers.
    pub fn last_frame(&self) -> [u8; crate::display::DIGIT_COUNT] {
        self.chain.last_frame()
    }

    pub fn mode(&self) -> DisplayMode {
        self.engine.mode()
    }

    pub fn current_duty(&self) -> u8 {
        self.dimmer.current_duty()
    }
}
