//! BME280 register map, calibration constants, and raw-sample parsing.
//!
//! Addresses and bit layouts come straight from the Bosch datasheet; the
//! calibration words are little-endian except the nibble-packed H4/H5 pair.

/// Primary I2C address (SDO low).
pub const I2C_ADDR_PRIMARY: u8 = 0x76;
/// Secondary I2C address (SDO high).
pub const I2C_ADDR_SECONDARY: u8 = 0x77;

/// Chip identifier register and its expected value.
pub const REG_CHIP_ID: u8 = 0xD0;
pub const CHIP_ID: u8 = 0x60;

/// Soft-reset register and command word.
pub const REG_RESET: u8 = 0xE0;
pub const RESET_CMD: u8 = 0xB6;

pub const REG_CTRL_HUM: u8 = 0xF2;
pub const REG_CTRL_MEAS: u8 = 0xF4;
pub const REG_CONFIG: u8 = 0xF5;

/// Start of the 8-byte pressure/temperature/humidity data block.
pub const REG_DATA_START: u8 = 0xF7;
pub const DATA_LEN: usize = 8;

/// Calibration register bases.
pub const REG_CALIB_TEMP: u8 = 0x88; // dig_t1..t3, 6 bytes
pub const REG_CALIB_PRES: u8 = 0x8E; // dig_p1..p9, 18 bytes
pub const REG_CALIB_HUM1: u8 = 0xA1; // dig_h1, 1 byte
pub const REG_CALIB_HUM2: u8 = 0xE1; // dig_h2..h6, 7 bytes

/// Humidity oversampling x1.
pub const CTRL_HUM_OSR_1X: u8 = 0x01;
/// Temperature x2, pressure x2, normal mode.
pub const CTRL_MEAS_DEFAULT: u8 = 0x6B;
/// Standby 62.5 ms, IIR filter x4.
pub const CONFIG_DEFAULT: u8 = 0x30;
/// Mask/bit for forcing a one-shot measurement on ctrl_meas.
pub const MODE_MASK: u8 = 0xFC;
pub const FORCED_MODE: u8 = 0x01;

// ---------------------------------------------------------------------------
// Calibration data
// ---------------------------------------------------------------------------

/// Factory calibration coefficients, read once at initialisation and
/// immutable afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,

    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,

    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationData {
    /// Parse the temperature section (6 bytes at 0x88).
    pub fn parse_temperature(&mut self, buf: &[u8; 6]) {
        self.dig_t1 = u16::from_le_bytes([buf[0], buf[1]]);
        self.dig_t2 = i16::from_le_bytes([buf[2], buf[3]]);
        self.dig_t3 = i16::from_le_bytes([buf[4], buf[5]]);
    }

    /// Parse the pressure section (18 bytes at 0x8E).
    pub fn parse_pressure(&mut self, buf: &[u8; 18]) {
        self.dig_p1 = u16::from_le_bytes([buf[0], buf[1]]);
        self.dig_p2 = i16::from_le_bytes([buf[2], buf[3]]);
        self.dig_p3 = i16::from_le_bytes([buf[4], buf[5]]);
        self.dig_p4 = i16::from_le_bytes([buf[6], buf[7]]);
        self.dig_p5 = i16::from_le_bytes([buf[8], buf[9]]);
        self.dig_p6 = i16::from_le_bytes([buf[10], buf[11]]);
        self.dig_p7 = i16::from_le_bytes([buf[12], buf[13]]);
        self.dig_p8 = i16::from_le_bytes([buf[14], buf[15]]);
        self.dig_p9 = i16::from_le_bytes([buf[16], buf[17]]);
    }

    /// Parse the humidity section: dig_h1 (1 byte at 0xA1) plus the
    /// 7-byte block at 0xE1. H4/H5 share a nibble-packed middle byte.
    pub fn parse_humidity(&mut self, h1: u8, buf: &[u8; 7]) {
        self.dig_h1 = h1;
        self.dig_h2 = i16::from_le_bytes([buf[0], buf[1]]);
        self.dig_h3 = buf[2];
        self.dig_h4 = ((buf[3] as i16) << 4) | (buf[4] & 0x0F) as i16;
        self.dig_h5 = ((buf[5] as i16) << 4) | (buf[4] >> 4) as i16;
        self.dig_h6 = buf[6] as i8;
    }
}

// ---------------------------------------------------------------------------
// Raw sample
// ---------------------------------------------------------------------------

/// Raw ADC words from one burst read: 20-bit pressure and temperature,
/// 16-bit humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: i32,
    pub temperature: i32,
    pub humidity: i32,
}

impl RawSample {
    /// Decode the 8-byte data block at 0xF7.
    ///
    /// This is the single canonical parse path; acquisition has no other
    /// way of producing a `RawSample`.
    pub fn parse(buf: &[u8; DATA_LEN]) -> Self {
        let pressure =
            ((buf[0] as u32) << 12 | (buf[1] as u32) << 4 | (buf[2] as u32) >> 4) as i32;
        let temperature =
            ((buf[3] as u32) << 12 | (buf[4] as u32) << 4 | (buf[5] as u32) >> 4) as i32;
        let humidity = ((buf[6] as u32) << 8 | buf[7] as u32) as i32;
        Self {
            pressure,
            temperature,
            humidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_calibration_is_little_endian() {
        let mut calib = CalibrationData::default();
        // dig_t1 = 27504 (0x6B70), dig_t2 = 26435 (0x6743), dig_t3 = -1000
        calib.parse_temperature(&[0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC]);
        assert_eq!(calib.dig_t1, 27504);
        assert_eq!(calib.dig_t2, 26435);
        assert_eq!(calib.dig_t3, -1000);
    }

    #[test]
    fn pressure_calibration_signed_words() {
        let mut calib = CalibrationData::default();
        let mut buf = [0u8; 18];
        buf[0..2].copy_from_slice(&36477u16.to_le_bytes());
        buf[2..4].copy_from_slice(&(-10685i16).to_le_bytes());
        buf[16..18].copy_from_slice(&6000i16.to_le_bytes());
        calib.parse_pressure(&buf);
        assert_eq!(calib.dig_p1, 36477);
        assert_eq!(calib.dig_p2, -10685);
        assert_eq!(calib.dig_p9, 6000);
    }

    #[test]
    fn humidity_h4_h5_nibble_packing() {
        let mut calib = CalibrationData::default();
        // E4=0x15, E5=0x2C, E6=0x03:
        //   h4 = 0x15<<4 | 0xC = 0x15C = 348
        //   h5 = 0x03<<4 | 0x2 = 0x32  = 50
        calib.parse_humidity(0x4B, &[0x61, 0x01, 0x00, 0x15, 0x2C, 0x03, 0x1E]);
        assert_eq!(calib.dig_h1, 0x4B);
        assert_eq!(calib.dig_h2, 0x0161);
        assert_eq!(calib.dig_h4, 348);
        assert_eq!(calib.dig_h5, 50);
        assert_eq!(calib.dig_h6, 30);
    }

    #[test]
    fn humidity_h6_sign_extends() {
        let mut calib = CalibrationData::default();
        calib.parse_humidity(0, &[0, 0, 0, 0, 0, 0, 0xFF]);
        assert_eq!(calib.dig_h6, -1);
    }

    #[test]
    fn raw_sample_packs_20_and_16_bit_words() {
        // pressure = 0x654AC >> stored as F7=65 F8=4A F9=C0
        // temp     = 0x7EED0 stored as FA=7E FB=ED FC=00
        // humidity = 0x7E21
        let buf = [0x65, 0x4A, 0xC0, 0x7E, 0xED, 0x00, 0x7E, 0x21];
        let raw = RawSample::parse(&buf);
        assert_eq!(raw.pressure, 0x654AC);
        assert_eq!(raw.temperature, 0x7EED0);
        assert_eq!(raw.humidity, 0x7E21);
    }

    #[test]
    fn raw_sample_all_ones() {
        let raw = RawSample::parse(&[0xFF; 8]);
        assert_eq!(raw.pressure, 0xFFFFF);
        assert_eq!(raw.temperature, 0xFFFFF);
        assert_eq!(raw.humidity, 0xFFFF);
    }
}
