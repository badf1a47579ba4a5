//! I2C register-bus adapter.
//!
//! Bridges any `embedded-hal` I2C master (plus a delay provider) to the
//! [`RegisterBus`] port. Register reads are a repeated-start write/read
//! pair, which is what the BME280 expects. On the device this wraps
//! `esp_idf_hal::i2c::I2cDriver`; the generic bound keeps the adapter
//! itself platform-free.
//!
//! [`RegisterBus`]: crate::app::ports::RegisterBus

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::debug;

use crate::app::ports::{BusError, RegisterBus};

/// Largest register write we ever issue (register byte + payload).
const WRITE_BUF: usize = 16;

pub struct HalI2cBus<I, D> {
    i2c: I,
    delay: D,
}

impl<I, D> HalI2cBus<I, D>
where
    I: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }
}

fn map_err<E: embedded_hal::i2c::Error>(e: E) -> BusError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        _ => BusError::Timeout,
    }
}

impl<I, D> RegisterBus for HalI2cBus<I, D>
where
    I: I2c,
    D: DelayNs,
{
    fn probe(&mut self, addr: u8) -> Result<(), BusError> {
        // Zero-length write: just the address phase and its ACK.
        self.i2c.write(addr, &[]).map_err(|e| {
            debug!("i2c: probe 0x{addr:02X} failed");
            map_err(e)
        })
    }

    fn read(&mut self, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.write_read(addr, &[reg], buf).map_err(|e| {
            debug!("i2c: read 0x{addr:02X}/0x{reg:02X} failed");
            map_err(e)
        })
    }

    fn write(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), BusError> {
        let mut frame = heapless::Vec::<u8, WRITE_BUF>::new();
        frame.push(reg).map_err(|_| BusError::Timeout)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| BusError::Timeout)?;
        self.i2c.write(addr, &frame).map_err(|e| {
            debug!("i2c: write 0x{addr:02X}/0x{reg:02X} failed");
            map_err(e)
        })
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
