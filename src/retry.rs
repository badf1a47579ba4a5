//! Bounded best-effort retry helper.
//!
//! The firmware has several places that want "try a few times with a short
//! pause, then give up and let the next cycle deal with it": sensor presence
//! probing, NVS writes, dimmer duty updates. They all share this one helper
//! instead of growing private retry loops.
//!
//! Both closures receive a `&mut C` context so that a single resource (an
//! I2C bus that also provides the delay, for instance) can serve as both
//! the operation target and the sleep source without fighting the borrow
//! checker.

use log::debug;

/// Retry `op` up to `attempts` times, sleeping `delay_ms` between failures.
///
/// Returns the first `Ok`, or the last `Err` once attempts are exhausted.
/// `attempts` of zero is treated as one.
pub fn retry_with_backoff<C, T, E, F, S>(
    ctx: &mut C,
    attempts: u32,
    delay_ms: u32,
    mut sleep: S,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(&mut C) -> Result<T, E>,
    S: FnMut(&mut C, u32),
{
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op(ctx) {
            Ok(v) => return Ok(v),
            Err(e) => {
                debug!("retry: attempt {attempt}/{attempts} failed");
                last_err = Some(e);
                if attempt < attempts {
                    sleep(ctx, delay_ms);
                }
            }
        }
    }
    // attempts >= 1, so at least one Err was recorded.
    Err(last_err.expect("retry executed at least once"))
}
