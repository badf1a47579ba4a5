//! Display engine: framebuffer, mode rotation, and value formatting.
//!
//! The engine is plain state driven by explicit timestamps. It is owned by
//! exactly one task and never shared, so there is no locking anywhere in
//! here; time comes in as an argument, which also makes every timing rule
//! testable without sleeping.

use log::debug;

use crate::app::ports::WallClock;
use crate::config::SystemConfig;
use crate::display::segments::{self, Glyph};
use crate::display::DIGIT_COUNT;

/// What the rotation currently shows. Rotation order is declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Time,
    Date,
    Temperature,
    Humidity,
    Pressure,
    RemoteTemperature,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 6] = [
        DisplayMode::Time,
        DisplayMode::Date,
        DisplayMode::Temperature,
        DisplayMode::Humidity,
        DisplayMode::Pressure,
        DisplayMode::RemoteTemperature,
    ];

    /// The next mode in rotation, wrapping back to [`DisplayMode::Time`].
    pub fn next(self) -> Self {
        match self {
            Self::Time => Self::Date,
            Self::Date => Self::Temperature,
            Self::Temperature => Self::Humidity,
            Self::Humidity => Self::Pressure,
            Self::Pressure => Self::RemoteTemperature,
            Self::RemoteTemperature => Self::Time,
        }
    }
}

/// The framebuffer plus rotation and blink state.
pub struct DisplayEngine {
    glyphs: [Glyph; DIGIT_COUNT],
    dots: [bool; DIGIT_COUNT],
    mode: DisplayMode,
    mode_started_ms: u64,
    last_flush_ms: u64,
    colon_on: bool,
    colon_toggled_ms: u64,
    config: SystemConfig,
}

impl DisplayEngine {
    pub fn new(config: SystemConfig, now_ms: u64) -> Self {
        Self {
            glyphs: [Glyph::Blank; DIGIT_COUNT],
            dots: [false; DIGIT_COUNT],
            mode: DisplayMode::Time,
            mode_started_ms: now_ms,
            last_flush_ms: 0,
            colon_on: true,
            colon_toggled_ms: now_ms,
            config,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    fn dwell_ms(&self, mode: DisplayMode) -> u64 {
        let ms = match mode {
            DisplayMode::Time => self.config.time_dwell_ms,
            DisplayMode::Date => self.config.date_dwell_ms,
            DisplayMode::Temperature => self.config.temperature_dwell_ms,
            DisplayMode::Humidity => self.config.humidity_dwell_ms,
            DisplayMode::Pressure => self.config.pressure_dwell_ms,
            DisplayMode::RemoteTemperature => self.config.remote_dwell_ms,
        };
        ms as u64
    }

    /// Jump straight to a mode and restart its dwell timer.
    pub fn set_mode(&mut self, mode: DisplayMode, now_ms: u64) {
        self.mode = mode;
        self.mode_started_ms = now_ms;
    }

    /// Advance the rotation if the current mode's dwell has elapsed.
    ///
    /// Advances at most one step per call, even when the task was stalled
    /// past several dwells, so every mode still gets screen time.
    pub fn maybe_advance(&mut self, now_ms: u64) -> Option<(DisplayMode, DisplayMode)> {
        if now_ms.saturating_sub(self.mode_started_ms) < self.dwell_ms(self.mode) {
            return None;
        }
        let from = self.mode;
        self.mode = from.next();
        self.mode_started_ms = now_ms;
        debug!("display: {from:?} -> {:?}", self.mode);
        Some((from, self.mode))
    }

    /// True when it is time to push the framebuffer to the hardware again.
    /// Marks the flush as done, so call it once per tick.
    pub fn should_flush(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_flush_ms) >= self.config.display_refresh_ms as u64 {
            self.last_flush_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Advance the colon blink phase.
    pub fn tick_colon(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.colon_toggled_ms) >= self.config.colon_blink_ms as u64 {
            self.colon_on = !self.colon_on;
            self.colon_toggled_ms = now_ms;
        }
    }

    /// Write one digit. Out-of-range positions are a silent no-op; a bad
    /// digit is already absorbed by [`Glyph::digit`].
    pub fn set_digit(&mut self, position: usize, glyph: Glyph, dp: bool) {
        if position < DIGIT_COUNT {
            self.glyphs[position] = glyph;
            self.dots[position] = dp;
        }
    }

    /// Blank all four digits.
    pub fn clear(&mut self) {
        self.glyphs = [Glyph::Blank; DIGIT_COUNT];
        self.dots = [false; DIGIT_COUNT];
    }

    /// Encode the framebuffer into shift-register bytes, one per digit.
    pub fn render(&self) -> [u8; DIGIT_COUNT] {
        let mut out = [0xFF; DIGIT_COUNT];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = segments::encode(self.glyphs[i], self.dots[i]);
        }
        out
    }

    // ── Value formatters ───────────────────────────────────────

    /// `HH:MM`, the colon carried on digit 1's decimal point and blinking
    /// at the configured half-period.
    pub fn show_time(&mut self, wall: WallClock) {
        self.set_digit(0, Glyph::digit(wall.hour / 10), false);
        self.set_digit(1, Glyph::digit(wall.hour % 10), self.colon_on);
        self.set_digit(2, Glyph::digit(wall.minute / 10), false);
        self.set_digit(3, Glyph::digit(wall.minute % 10), false);
    }

    /// `DD.MM` with a steady separator dot.
    pub fn show_date(&mut self, wall: WallClock) {
        self.set_digit(0, Glyph::digit(wall.day / 10), false);
        self.set_digit(1, Glyph::digit(wall.day % 10), true);
        self.set_digit(2, Glyph::digit(wall.month / 10), false);
        self.set_digit(3, Glyph::digit(wall.month % 10), false);
    }

    /// Local temperature as `dd.d C` (or `-d.d C`). Values outside the
    /// one-decimal display range blank the screen entirely.
    pub fn show_temperature(&mut self, celsius: f32) {
        if !(-9.9..=99.9).contains(&celsius) {
            self.clear();
            return;
        }

        let whole = (celsius as i32).unsigned_abs() as u8;
        let tenths = ((celsius * 10.0) as i32 % 10).unsigned_abs() as u8;

        if celsius < 0.0 {
            self.set_digit(0, Glyph::Minus, false);
        } else {
            self.set_digit(0, Glyph::digit(whole / 10), false);
        }
        self.set_digit(1, Glyph::digit(whole % 10), true);
        self.set_digit(2, Glyph::digit(tenths), false);
        self.set_digit(3, Glyph::C, false);
    }

    /// Relative humidity as `dd.d h`.
    pub fn show_humidity(&mut self, percent: f32) {
        if !(0.0..=99.9).contains(&percent) {
            self.clear();
            return;
        }

        let whole = percent as u8;
        let tenths = ((percent * 10.0) as i32 % 10) as u8;

        self.set_digit(0, Glyph::digit(whole / 10), false);
        self.set_digit(1, Glyph::digit(whole % 10), true);
        self.set_digit(2, Glyph::digit(tenths), false);
        self.set_digit(3, Glyph::LowerH, false);
    }

    /// Pressure in whole hPa across all four digits, rounded to nearest.
    pub fn show_pressure(&mut self, hpa: f32) {
        let value = ((hpa + 0.5) as i32).clamp(0, 9999) as u16;
        self.set_digit(0, Glyph::digit((value / 1000 % 10) as u8), false);
        self.set_digit(1, Glyph::digit((value / 100 % 10) as u8), false);
        self.set_digit(2, Glyph::digit((value / 10 % 10) as u8), false);
        self.set_digit(3, Glyph::digit((value % 10) as u8), false);
    }

    /// Remote hub temperature, prefixed with `r`. Implausible values show
    /// `r---` instead of numbers.
    pub fn show_remote_temperature(&mut self, celsius: f32) {
        self.set_digit(0, Glyph::R, false);

        if celsius <= -40.0 || celsius >= 140.0 {
            self.set_digit(1, Glyph::Minus, false);
            self.set_digit(2, Glyph::Minus, false);
            self.set_digit(3, Glyph::Minus, false);
            return;
        }

        let whole = (celsius as i32).unsigned_abs() as u8;
        let tenths = ((celsius * 10.0) as i32 % 10).unsigned_abs() as u8;

        if celsius < 0.0 {
            self.set_digit(1, Glyph::Minus, false);
        } else {
            self.set_digit(1, Glyph::digit(whole / 10), false);
        }
        self.set_digit(2, Glyph::digit(whole % 10), true);
        self.set_digit(3, Glyph::digit(tenths), false);
    }
}
