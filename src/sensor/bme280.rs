//! BME280 acquisition state machine.
//!
//! Owns the [`RegisterBus`] and walks the device through detection,
//! calibration load, configuration, and forced-mode measurement cycles.
//! The driver never panics on bus trouble: a failed cycle returns an error,
//! keeps the previously cached reading, and leaves recovery to the next
//! cycle. Only *out-of-range* data replaces the cache, with the sentinel
//! reading, because stale-but-plausible beats fresh-but-impossible on a
//! display, while fresh-but-impossible must not linger either.

use log::{debug, info, warn};

use crate::app::ports::{BusError, RegisterBus};
use crate::error::SensorError;
use crate::retry::retry_with_backoff;
use crate::sensor::compensation::{
    INVALID_READING, compensate_humidity, compensate_pressure, compensate_temperature,
};
use crate::sensor::registers::{
    self, CalibrationData, RawSample, CHIP_ID, CONFIG_DEFAULT, CTRL_HUM_OSR_1X,
    CTRL_MEAS_DEFAULT, DATA_LEN, FORCED_MODE, I2C_ADDR_PRIMARY, I2C_ADDR_SECONDARY, MODE_MASK,
    REG_CHIP_ID, REG_CONFIG, REG_CTRL_HUM, REG_CTRL_MEAS, REG_DATA_START, REG_RESET, RESET_CMD,
};
use crate::sensor::CompensatedReading;

/// Presence-probe retry policy per candidate address.
const PROBE_ATTEMPTS: u32 = 3;
const PROBE_RETRY_DELAY_MS: u32 = 10;
/// Post-soft-reset startup time (datasheet t_startup is 2 ms; leave margin).
const RESET_SETTLE_MS: u32 = 5;

/// Initialisation progress. `Ready` is the only state that permits
/// measurement cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// No bus traffic yet.
    Uninitialized,
    /// A device ACKed and identified itself as a BME280 at this address.
    Detected(u8),
    /// All three calibration sections parsed.
    CalibrationLoaded(u8),
    /// Configured for forced-mode cycles.
    Ready(u8),
}

/// BME280 driver over any [`RegisterBus`].
pub struct Bme280<B: RegisterBus> {
    bus: B,
    state: SensorState,
    calib: CalibrationData,
    settle_ms: u32,
    last: Option<CompensatedReading>,
}

impl<B: RegisterBus> Bme280<B> {
    /// `settle_ms` is the wait between kicking a forced measurement and
    /// reading the data block.
    pub fn new(bus: B, settle_ms: u32) -> Self {
        Self {
            bus,
            state: SensorState::Uninitialized,
            calib: CalibrationData::default(),
            settle_ms,
            last: None,
        }
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    /// True once [`init`](Self::init) has completed.
    pub fn is_working(&self) -> bool {
        matches!(self.state, SensorState::Ready(_))
    }

    /// The most recent cached reading, valid or sentinel.
    pub fn last_reading(&self) -> Option<CompensatedReading> {
        self.last
    }

    pub fn calibration(&self) -> &CalibrationData {
        &self.calib
    }

    /// Direct access to the underlying bus, mainly for test harnesses.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Full bring-up: detect, soft-reset, load calibration, configure.
    ///
    /// Any failure leaves the driver in the furthest state it reached, so a
    /// later retry of `init()` repeats only from the top (the sequence is
    /// idempotent).
    pub fn init(&mut self) -> Result<(), SensorError> {
        let addr = self.detect()?;
        self.state = SensorState::Detected(addr);

        self.soft_reset(addr)?;
        self.load_calibration(addr)?;
        self.state = SensorState::CalibrationLoaded(addr);

        self.configure(addr)?;
        self.state = SensorState::Ready(addr);
        info!("bme280: ready at 0x{addr:02X}");
        Ok(())
    }

    /// One forced-mode measurement cycle.
    ///
    /// Transport failures return an error and leave the cached reading
    /// untouched. Out-of-range data caches the sentinel reading before
    /// returning [`SensorError::OutOfRange`].
    pub fn acquire(&mut self, now_ms: u64) -> Result<CompensatedReading, SensorError> {
        let SensorState::Ready(addr) = self.state else {
            return Err(SensorError::NotInitialized);
        };

        // Kick a one-shot measurement, preserving the oversampling bits.
        let mut ctrl = [0u8; 1];
        self.bus
            .read(addr, REG_CTRL_MEAS, &mut ctrl)
            .map_err(|_| SensorError::BusReadFailed)?;
        self.bus
            .write(addr, REG_CTRL_MEAS, &[(ctrl[0] & MODE_MASK) | FORCED_MODE])
            .map_err(|_| SensorError::BusWriteFailed)?;
        self.bus.delay_ms(self.settle_ms);

        let mut block = [0u8; DATA_LEN];
        self.bus
            .read(addr, REG_DATA_START, &mut block)
            .map_err(|_| SensorError::BusReadFailed)?;
        let raw = RawSample::parse(&block);

        // Temperature first: it produces the t_fine the other two need.
        let (temp, t_fine) = compensate_temperature(raw.temperature, &self.calib);
        let pres = compensate_pressure(raw.pressure, t_fine, &self.calib);
        let hum = compensate_humidity(raw.humidity, t_fine, &self.calib);

        if pres == INVALID_READING || !CompensatedReading::in_plausible_range(temp, hum, pres) {
            warn!("bme280: reading out of range (t={temp:.2} h={hum:.2} p={pres:.2})");
            self.last = Some(CompensatedReading::invalid(now_ms));
            return Err(SensorError::OutOfRange);
        }

        let reading = CompensatedReading {
            temperature_c: temp,
            humidity_pct: hum,
            pressure_hpa: pres,
            valid: true,
            timestamp_ms: now_ms,
        };
        self.last = Some(reading);
        debug!("bme280: t={temp:.2}°C h={hum:.2}%RH p={pres:.2}hPa");
        Ok(reading)
    }

    /// Probe both candidate addresses and verify the chip identifier.
    fn detect(&mut self) -> Result<u8, SensorError> {
        for addr in [I2C_ADDR_PRIMARY, I2C_ADDR_SECONDARY] {
            let probed: Result<(), BusError> = retry_with_backoff(
                &mut self.bus,
                PROBE_ATTEMPTS,
                PROBE_RETRY_DELAY_MS,
                |bus, ms| bus.delay_ms(ms),
                |bus| bus.probe(addr),
            );
            if probed.is_err() {
                debug!("bme280: no ACK at 0x{addr:02X}");
                continue;
            }

            let mut id = [0u8; 1];
            self.bus
                .read(addr, REG_CHIP_ID, &mut id)
                .map_err(|_| SensorError::BusReadFailed)?;
            if id[0] != CHIP_ID {
                warn!("bme280: chip ID 0x{:02X} at 0x{addr:02X}, want 0x{CHIP_ID:02X}", id[0]);
                return Err(SensorError::ChipIdMismatch);
            }
            info!("bme280: detected at 0x{addr:02X}");
            return Ok(addr);
        }
        warn!("bme280: not detected at 0x{I2C_ADDR_PRIMARY:02X} or 0x{I2C_ADDR_SECONDARY:02X}");
        Err(SensorError::NotDetected)
    }

    fn soft_reset(&mut self, addr: u8) -> Result<(), SensorError> {
        self.bus
            .write(addr, REG_RESET, &[RESET_CMD])
            .map_err(|_| SensorError::BusWriteFailed)?;
        self.bus.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    /// Read the three calibration sections. A failure in any section aborts
    /// the whole load; partially parsed coefficients are never used.
    fn load_calibration(&mut self, addr: u8) -> Result<(), SensorError> {
        let mut calib = CalibrationData::default();

        let mut temp = [0u8; 6];
        self.bus
            .read(addr, registers::REG_CALIB_TEMP, &mut temp)
            .map_err(|_| SensorError::CalibrationReadFailed)?;
        calib.parse_temperature(&temp);

        let mut pres = [0u8; 18];
        self.bus
            .read(addr, registers::REG_CALIB_PRES, &mut pres)
            .map_err(|_| SensorError::CalibrationReadFailed)?;
        calib.parse_pressure(&pres);

        let mut h1 = [0u8; 1];
        self.bus
            .read(addr, registers::REG_CALIB_HUM1, &mut h1)
            .map_err(|_| SensorError::CalibrationReadFailed)?;
        let mut hum = [0u8; 7];
        self.bus
            .read(addr, registers::REG_CALIB_HUM2, &mut hum)
            .map_err(|_| SensorError::CalibrationReadFailed)?;
        calib.parse_humidity(h1[0], &hum);

        self.calib = calib;
        Ok(())
    }

    /// Oversampling and filter setup. ctrl_hum must be written before
    /// ctrl_meas or the humidity setting is ignored (datasheet §5.4.3).
    fn configure(&mut self, addr: u8) -> Result<(), SensorError> {
        self.bus
            .write(addr, REG_CTRL_HUM, &[CTRL_HUM_OSR_1X])
            .map_err(|_| SensorError::BusWriteFailed)?;
        self.bus
            .write(addr, REG_CTRL_MEAS, &[CTRL_MEAS_DEFAULT])
            .map_err(|_| SensorError::BusWriteFailed)?;
        self.bus
            .write(addr, REG_CONFIG, &[CONFIG_DEFAULT])
            .map_err(|_| SensorError::BusWriteFailed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Scripted register-map bus for driver tests.
    struct FakeBus {
        present: Vec<u8>,
        regs: HashMap<u8, u8>,
        fail_reads: bool,
        fail_writes: bool,
        writes: Vec<(u8, u8, Vec<u8>)>,
    }

    impl FakeBus {
        fn new(present: &[u8]) -> Self {
            Self {
                present: present.to_vec(),
                regs: HashMap::new(),
                fail_reads: false,
                fail_writes: false,
                writes: Vec::new(),
            }
        }

        fn load(&mut self, base: u8, bytes: &[u8]) {
            for (i, b) in bytes.iter().enumerate() {
                self.regs.insert(base + i as u8, *b);
            }
        }

        /// A BME280 at 0x76 with the datasheet calibration set and a data
        /// block decoding to 25.08 °C / 60.13 %RH / 1006.53 hPa.
        fn datasheet_device() -> Self {
            let mut bus = Self::new(&[I2C_ADDR_PRIMARY]);
            bus.load(REG_CHIP_ID, &[CHIP_ID]);
            bus.load(registers::REG_CALIB_TEMP, &[0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC]);
            bus.load(
                registers::REG_CALIB_PRES,
                &[
                    0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C, 0x00, 0xF9, 0xFF,
                    0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17,
                ],
            );
            bus.load(registers::REG_CALIB_HUM1, &[0x4B]);
            bus.load(registers::REG_CALIB_HUM2, &[0x61, 0x01, 0x00, 0x15, 0x04, 0x00, 0x1E]);
            // adc_p = 415148, adc_t = 519888, adc_h = 32768
            bus.load(REG_DATA_START, &[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x80, 0x00]);
            bus
        }
    }

    impl RegisterBus for FakeBus {
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

        fn write(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), BusError> {
            if self.fail_writes {
                return Err(BusError::Nack);
            }
            self.writes.push((addr, reg, data.to_vec()));
            for (i, b) in data.iter().enumerate() {
                self.regs.insert(reg + i as u8, *b);
            }
            Ok(())
        }

        fn delay_ms(&mut self, _ms: u32) {}
    }

    #[test]
    fn init_walks_to_ready_and_loads_calibration() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        sensor.init().unwrap();
        assert_eq!(sensor.state(), SensorState::Ready(I2C_ADDR_PRIMARY));
        assert!(sensor.is_working());
        assert_eq!(sensor.calibration().dig_t1, 27504);
        assert_eq!(sensor.calibration().dig_p9, 6000);
        assert_eq!(sensor.calibration().dig_h4, 340);
    }

    #[test]
    fn init_falls_back_to_secondary_address() {
        let mut bus = FakeBus::datasheet_device();
        bus.present = vec![I2C_ADDR_SECONDARY];
        let mut sensor = Bme280::new(bus, 10);
        sensor.init().unwrap();
        assert_eq!(sensor.state(), SensorState::Ready(I2C_ADDR_SECONDARY));
    }

    #[test]
    fn init_fails_when_nothing_acks() {
        let mut sensor = Bme280::new(FakeBus::new(&[]), 10);
        assert_eq!(sensor.init(), Err(SensorError::NotDetected));
        assert!(!sensor.is_working());
    }

    #[test]
    fn init_rejects_wrong_chip_id() {
        let mut bus = FakeBus::datasheet_device();
        bus.load(REG_CHIP_ID, &[0x58]); // a BMP280
        let mut sensor = Bme280::new(bus, 10);
        assert_eq!(sensor.init(), Err(SensorError::ChipIdMismatch));
    }

    #[test]
    fn configure_writes_ctrl_hum_before_ctrl_meas() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        sensor.init().unwrap();
        let regs: Vec<u8> = sensor.bus.writes.iter().map(|(_, reg, _)| *reg).collect();
        let hum_pos = regs.iter().position(|r| *r == REG_CTRL_HUM).unwrap();
        let meas_pos = regs.iter().position(|r| *r == REG_CTRL_MEAS).unwrap();
        assert!(hum_pos < meas_pos);
    }

    #[test]
    fn acquire_before_init_is_rejected() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        assert_eq!(sensor.acquire(0), Err(SensorError::NotInitialized));
    }

    #[test]
    fn acquire_produces_reference_reading() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        sensor.init().unwrap();
        let reading = sensor.acquire(5000).unwrap();
        assert!(reading.valid);
        assert_eq!(reading.timestamp_ms, 5000);
        assert!((reading.temperature_c - 25.08).abs() < 0.01);
        assert!((reading.humidity_pct - 60.13).abs() < 0.01);
        assert!((reading.pressure_hpa - 1006.53).abs() < 0.01);
        assert_eq!(sensor.last_reading(), Some(reading));
    }

    #[test]
    fn acquire_sets_forced_mode_preserving_oversampling() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        sensor.init().unwrap();
        sensor.bus.writes.clear();
        sensor.acquire(0).unwrap();
        let forced = sensor
            .bus
            .writes
            .iter()
            .find(|(_, reg, _)| *reg == REG_CTRL_MEAS)
            .unwrap();
        // ctrl_meas was 0x6B after configure; forced write keeps the top bits.
        assert_eq!(forced.2, vec![(CTRL_MEAS_DEFAULT & MODE_MASK) | FORCED_MODE]);
    }

    #[test]
    fn bus_failure_preserves_cached_reading() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        sensor.init().unwrap();
        let good = sensor.acquire(1000).unwrap();

        sensor.bus.fail_reads = true;
        assert_eq!(sensor.acquire(2000), Err(SensorError::BusReadFailed));
        assert_eq!(sensor.last_reading(), Some(good));
    }

    #[test]
    fn out_of_range_reading_caches_the_sentinel() {
        let mut sensor = Bme280::new(FakeBus::datasheet_device(), 10);
        sensor.init().unwrap();
        sensor.acquire(1000).unwrap();

        // All-zero data block decodes to a wildly negative temperature.
        sensor.bus.load(REG_DATA_START, &[0u8; DATA_LEN]);
        assert_eq!(sensor.acquire(2000), Err(SensorError::OutOfRange));
        let cached = sensor.last_reading().unwrap();
        assert!(!cached.valid);
        assert_eq!(cached.temperature_c, INVALID_READING);
        assert_eq!(cached.timestamp_ms, 2000);
    }
}
