//! Event sink that writes domain events to the log.
//!
//! The default [`EventSink`] wiring. Telemetry glue (MQTT publisher, HTTP
//! status cache) can wrap or replace this without touching the task loops.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

#[derive(Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Reading(r) => info!(
                "reading: {:.2}°C {:.2}%RH {:.2}hPa",
                r.temperature_c, r.humidity_pct, r.pressure_hpa
            ),
            AppEvent::SensorUnavailable => warn!("sensor unavailable"),
            AppEvent::ModeChanged { from, to } => info!("display mode: {from:?} -> {to:?}"),
            AppEvent::BrightnessChanged(pct) => info!("brightness: {pct}%"),
            AppEvent::PreferencesUpdated => info!("display preferences updated"),
        }
    }
}
