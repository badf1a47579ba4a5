//! Sensor pipeline integration: Bme280 driver + sensor task cycle against
//! the scripted bus, asserting what lands in the shared status and the
//! event stream.

use auxdisplay::app::events::AppEvent;
use auxdisplay::sensor::registers::{I2C_ADDR_PRIMARY, I2C_ADDR_SECONDARY, REG_DATA_START};
use auxdisplay::sensor::Bme280;
use auxdisplay::status::SharedStatus;
use auxdisplay::tasks::run_sensor_cycle;

use crate::mock_hw::{CountingWatchdog, MockBus, RecordingSink};

#[test]
fn full_cycle_publishes_a_validated_reading() {
    let mut sensor = Bme280::new(MockBus::bme280_at(I2C_ADDR_PRIMARY), 10);
    let status = SharedStatus::new();
    let watchdog = CountingWatchdog::default();
    let mut sink = RecordingSink::default();

    run_sensor_cycle(&mut sensor, &status, &watchdog, &mut sink, 1_000);

    let snap = status.snapshot();
    assert!(snap.sensor_working);
    assert!(snap.reading.valid);
    assert!((snap.reading.temperature_c - 25.08).abs() < 0.01);
    assert!((snap.reading.humidity_pct - 60.13).abs() < 0.01);
    assert!((snap.reading.pressure_hpa - 1006.53).abs() < 0.01);
    assert_eq!(snap.reading.timestamp_ms, 1_000);

    assert_eq!(watchdog.beats.get(), 1);
    assert_eq!(sink.count_readings(), 1);
}

#[test]
fn secondary_address_is_found_on_first_cycle() {
    let mut sensor = Bme280::new(MockBus::bme280_at(I2C_ADDR_SECONDARY), 10);
    let status = SharedStatus::new();
    let mut sink = RecordingSink::default();

    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 0);
    assert!(status.snapshot().sensor_working);
}

#[test]
fn missing_sensor_reports_unavailable_every_cycle() {
    let mut sensor = Bme280::new(MockBus::absent(), 10);
    let status = SharedStatus::new();
    let watchdog = CountingWatchdog::default();
    let mut sink = RecordingSink::default();

    for now in [0, 2_000, 4_000] {
        run_sensor_cycle(&mut sensor, &status, &watchdog, &mut sink, now);
    }

    let snap = status.snapshot();
    assert!(!snap.sensor_working);
    assert!(!snap.reading.valid);
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::SensorUnavailable))
            .count(),
        3
    );
    // The watchdog is still fed while the sensor is down.
    assert_eq!(watchdog.beats.get(), 3);
}

#[test]
fn transient_bus_failure_keeps_the_published_reading() {
    let mut sensor = Bme280::new(MockBus::bme280_at(I2C_ADDR_PRIMARY), 10);
    let status = SharedStatus::new();
    let mut sink = RecordingSink::default();

    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 1_000);
    let before = status.snapshot().reading;
    assert!(before.valid);

    sensor.bus_mut().fail_reads = true;
    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 3_000);

    let after = status.snapshot();
    assert_eq!(after.reading, before, "stale reading survives a bad cycle");
    assert!(after.sensor_working, "a bad cycle is not a dead sensor");

    // Bus recovers: the next cycle publishes fresh data.
    sensor.bus_mut().fail_reads = false;
    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 5_000);
    assert_eq!(status.snapshot().reading.timestamp_ms, 5_000);
}

#[test]
fn out_of_range_data_blanks_the_published_reading() {
    let mut sensor = Bme280::new(MockBus::bme280_at(I2C_ADDR_PRIMARY), 10);
    let status = SharedStatus::new();
    let mut sink = RecordingSink::default();

    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 1_000);
    assert!(status.snapshot().reading.valid);

    // All-zero data block decodes to an impossible temperature.
    sensor.bus_mut().load(REG_DATA_START, &[0u8; 8]);
    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 3_000);

    let snap = status.snapshot();
    assert!(!snap.reading.valid, "sentinel replaces the stale value");
    assert_eq!(snap.reading.timestamp_ms, 3_000);
}

#[test]
fn sensor_recovers_after_reseating() {
    // Starts absent: init fails.
    let mut sensor = Bme280::new(MockBus::absent(), 10);
    let status = SharedStatus::new();
    let mut sink = RecordingSink::default();

    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 0);
    assert!(!status.snapshot().sensor_working);

    // Module appears on the bus; the next cycle re-runs init and reads.
    *sensor.bus_mut() = MockBus::bme280_at(I2C_ADDR_PRIMARY);
    run_sensor_cycle(&mut sensor, &status, &CountingWatchdog::default(), &mut sink, 2_000);

    let snap = status.snapshot();
    assert!(snap.sensor_working);
    assert!(snap.reading.valid);
}
