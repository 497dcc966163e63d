//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry {
                snapshot,
                published,
            } => {
                let s = &snapshot.sensors;
                let a = &snapshot.actuators;
                info!(
                    "TELEM | T={:.2}\u{00b0}C RH={:.2}% P={:.2}hPa L={:.2}lx smoke={:.2}ppm | \
                     relays={:?} breaker={} | {}",
                    s.temperature,
                    s.humidity,
                    s.pressure,
                    s.light_intensity,
                    s.smoke_density,
                    a.relays,
                    a.breaker,
                    if *published { "published" } else { "skipped" },
                );
            }
            AppEvent::CommandApplied { intent, state } => {
                info!(
                    "CMD | relays={:?} breaker={:?} -> relays={:?} breaker={}",
                    intent.relays, intent.breaker, state.relays, state.breaker
                );
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD | rejected: {}", e);
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("SESSION | {:?} -> {:?}", from, to);
            }
            AppEvent::SessionFault(e) => {
                warn!("SESSION | fault: {}", e);
            }
            AppEvent::DiscoveryPublished { count } => {
                info!("DISCOVERY | {} registrations published", count);
            }
            AppEvent::ReconnectScheduled { attempt, after } => {
                info!("LINK | reconnect in {}ms (failures={})", after.as_millis(), attempt);
            }
            AppEvent::Started { device_id } => {
                info!("START | device_id={}", device_id);
            }
        }
    }
}
