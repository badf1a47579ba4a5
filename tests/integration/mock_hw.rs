//! Mock hardware for integration tests.
//!
//! A scripted I2C register map standing in for the BME280, a settable
//! clock, and an event recorder, so the full sensor→status→display
//! pipeline runs on the host with no real hardware.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use auxdisplay::app::events::AppEvent;
use auxdisplay::app::ports::{BusError, Clock, EventSink, RegisterBus, WallClock, WatchdogPort};
use auxdisplay::sensor::registers::{
    CHIP_ID, REG_CALIB_HUM1, REG_CALIB_HUM2, REG_CALIB_PRES, REG_CALIB_TEMP, REG_CHIP_ID,
    REG_DATA_START,
};

// ── Scripted I2C bus ──────────────────────────────────────────

/// Register-map bus. Writes land in the map, reads come back out, and the
/// whole device can be made to disappear or fail mid-run.
pub struct MockBus {
    pub present: Vec<u8>,
    pub regs: HashMap<u8, u8>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub delays_ms: u64,
}

#[allow(dead_code)]
impl MockBus {
    pub fn absent() -> Self {
        Self {
            present: Vec::new(),
            regs: HashMap::new(),
            fail_reads: false,
            fail_writes: false,
            delays_ms: 0,
        }
    }

    /// A healthy BME280 at 0x76 with the datasheet calibration set and a
    /// data block decoding to 25.08 °C / 60.13 %RH / 1006.53 hPa.
    pub fn bme280_at(addr: u8) -> Self {
        let mut bus = Self {
            present: vec![addr],
            regs: HashMap::new(),
            fail_reads: false,
            fail_writes: false,
            delays_ms: 0,
        };
        bus.load(REG_CHIP_ID, &[CHIP_ID]);
        bus.load(REG_CALIB_TEMP, &[0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC]);
        bus.load(
            REG_CALIB_PRES,
            &[
                0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C, 0x00, 0xF9, 0xFF, 0x8C,
                0x3C, 0xF8, 0xC6, 0x70, 0x17,
            ],
        );
        bus.load(REG_CALIB_HUM1, &[0x4B]);
        bus.load(REG_CALIB_HUM2, &[0x61, 0x01, 0x00, 0x15, 0x04, 0x00, 0x1E]);
        bus.load(REG_DATA_START, &[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x80, 0x00]);
        bus
    }

    pub fn load(&mut self, base: u8, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.regs.insert(base + i as u8, *b);
        }
    }
}

impl RegisterBus for MockBus {
    fn probe(&mut self, addr: u8) -> Result<(), BusError> {
        if self.present.contains(&addr) {
            Ok(())
        } else {
            Err(BusError::Nack)
        }
    }

    fn read(&mut self, _addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        if self.fail_reads {
            return Err(BusError::Timeout);
        }
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.regs.get(&(reg + i as u8)).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn write(&mut self, _addr: u8, reg: u8, data: &[u8]) -> Result<(), BusError> {
        if self.fail_writes {
            return Err(BusError::Nack);
        }
        for (i, b) in data.iter().enumerate() {
            self.regs.insert(reg + i as u8, *b);
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms += ms as u64;
    }
}

// ── Settable clock ────────────────────────────────────────────

#[derive(Clone)]
pub struct FakeClock {
    millis: Rc<Cell<u64>>,
    wall: Rc<Cell<Option<WallClock>>>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self {
            millis: Rc::new(Cell::new(0)),
            wall: Rc::new(Cell::new(None)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.millis.set(self.millis.get() + ms);
    }

    pub fn set_millis(&self, ms: u64) {
        self.millis.set(ms);
    }

    pub fn set_wall(&self, wall: Option<WallClock>) {
        self.wall.set(wall);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> u64 {
        self.millis.get()
    }

    fn wall_clock(&self) -> Option<WallClock> {
        self.wall.get()
    }
}

// ── Watchdog counter ──────────────────────────────────────────

#[derive(Default)]
pub struct CountingWatchdog {
    pub beats: Cell<u32>,
}

impl WatchdogPort for CountingWatchdog {
    fn heartbeat(&self) {
        self.beats.set(self.beats.get() + 1);
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count_readings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Reading(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
