//! BME280 fixed-point compensation arithmetic.
//!
//! Direct port of the datasheet's integer reference algorithm. The shift
//! amounts, multiply widths, and operation order are load-bearing: the
//! rounding and overflow behaviour must match the reference output
//! bit-for-bit, so none of the expressions here may be "simplified".
//! Arithmetic uses explicit wrapping ops — the reference implementation
//! runs on two's-complement hardware, and malformed calibration data must
//! produce garbage output, never a panic.
//!
//! Temperature compensation produces the fine-temperature intermediate that
//! pressure and humidity compensation both depend on. The dependency is an
//! explicit [`TFine`] value threaded through the calls — temperature must
//! run first in every cycle.

use super::registers::CalibrationData;

/// Sentinel returned for readings that could not be computed or failed
/// validation.
pub const INVALID_READING: f32 = -999.0;

/// Fine-temperature intermediate. Only [`compensate_temperature`] can
/// produce one, which makes the temperature-first ordering a type-level
/// guarantee rather than a convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TFine(pub i32);

/// Compensate a raw 20-bit temperature word. Returns degrees Celsius and
/// the fine-temperature intermediate for the pressure/humidity paths.
pub fn compensate_temperature(adc_t: i32, calib: &CalibrationData) -> (f32, TFine) {
    let t1 = calib.dig_t1 as i32;
    let t2 = calib.dig_t2 as i32;
    let t3 = calib.dig_t3 as i32;

    let var1 = ((adc_t >> 3).wrapping_sub(t1 << 1)).wrapping_mul(t2) >> 11;

    let d = (adc_t >> 4).wrapping_sub(t1);
    let var2 = ((d.wrapping_mul(d) >> 12).wrapping_mul(t3)) >> 14;

    let t_fine = var1.wrapping_add(var2);
    let t = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;
    (t as f32 / 100.0, TFine(t_fine))
}

/// Compensate a raw 20-bit pressure word into hPa.
///
/// 64-bit fixed-point pipeline. Returns [`INVALID_READING`] when the
/// first-stage denominator is zero (all-zero calibration); the plausibility
/// range check is the caller's job, not this function's.
pub fn compensate_pressure(adc_p: i32, t_fine: TFine, calib: &CalibrationData) -> f32 {
    let mut var1: i64 = (t_fine.0 as i64).wrapping_sub(128_000);
    let mut var2: i64 = var1.wrapping_mul(var1).wrapping_mul(calib.dig_p6 as i64);
    var2 = var2.wrapping_add(var1.wrapping_mul(calib.dig_p5 as i64) << 17);
    var2 = var2.wrapping_add((calib.dig_p4 as i64) << 35);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(calib.dig_p3 as i64) >> 8)
        .wrapping_add(var1.wrapping_mul(calib.dig_p2 as i64) << 12);
    var1 = (1i64 << 47).wrapping_add(var1).wrapping_mul(calib.dig_p1 as i64) >> 33;

    if var1 == 0 {
        return INVALID_READING; // Avoid division by zero.
    }

    let mut p: i64 = 1_048_576 - adc_p as i64;
    p = ((p << 31).wrapping_sub(var2)).wrapping_mul(3125).wrapping_div(var1);
    var1 = (calib.dig_p9 as i64).wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
    var2 = (calib.dig_p8 as i64).wrapping_mul(p) >> 19;
    p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add((calib.dig_p7 as i64) << 4);

    // p is Pa in Q24.8; convert to hPa.
    (p as f32 / 256.0) / 100.0
}

/// Compensate a raw 16-bit humidity word into %RH.
///
/// 32-bit pipeline; the intermediate is clamped into `[0, 419430400]`
/// before the final `>> 12` and `/ 1024` scale-down, bounding the output
/// to `[0.0, 100.0]` by construction.
pub fn compensate_humidity(adc_h: i32, t_fine: TFine, calib: &CalibrationData) -> f32 {
    let h1 = calib.dig_h1 as i32;
    let h2 = calib.dig_h2 as i32;
    let h3 = calib.dig_h3 as i32;
    let h4 = calib.dig_h4 as i32;
    let h5 = calib.dig_h5 as i32;
    let h6 = calib.dig_h6 as i32;

    let mut v: i32 = t_fine.0.wrapping_sub(76_800);

    let lhs = ((adc_h << 14).wrapping_sub(h4 << 20).wrapping_sub(h5.wrapping_mul(v)))
        .wrapping_add(16_384)
        >> 15;
    let rhs = ((((v.wrapping_mul(h6) >> 10)
        .wrapping_mul((v.wrapping_mul(h3) >> 11).wrapping_add(32_768))
        >> 10)
        .wrapping_add(2_097_152))
    .wrapping_mul(h2)
    .wrapping_add(8_192))
        >> 14;
    v = lhs.wrapping_mul(rhs);

    v = v.wrapping_sub((((v >> 15).wrapping_mul(v >> 15) >> 7).wrapping_mul(h1)) >> 4);

    v = v.clamp(0, 419_430_400);
    (v >> 12) as f32 / 1024.0
}
