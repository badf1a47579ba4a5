//! ESP32 clock adapter.
//!
//! - **`target_os = "espidf"`** — monotonic time from `esp_timer_get_time()`
//!   and wall-clock fields from `localtime_r`, gated on the system clock
//!   actually having been set (NTP or otherwise).
//! - **`not(target_os = "espidf")`** — `std::time::Instant` for monotonic
//!   time; wall clock is always `None`, the same as a device before sync.

use crate::app::ports::{Clock, WallClock};

pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for Esp32Clock {
    #[cfg(target_os = "espidf")]
    fn now_millis(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    fn wall_clock(&self) -> Option<WallClock> {
        use core::ptr;

        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        // Reject obviously unsynced time (e.g. before 2020-01-01)
        const EPOCH_2020: i64 = 1_577_836_800;
        if tv.tv_sec < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        if !(0..=23).contains(&tm.tm_hour) {
            return None;
        }
        Some(WallClock {
            hour: tm.tm_hour as u8,
            minute: tm.tm_min as u8,
            day: tm.tm_mday as u8,
            month: (tm.tm_mon + 1) as u8,
        })
    }

    /// On non-ESP targets (simulation) always `None`.
    #[cfg(not(target_os = "espidf"))]
    fn wall_clock(&self) -> Option<WallClock> {
        None
    }
}
