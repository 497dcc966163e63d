//! Periodic telemetry cycle.
//!
//! Every period: acquire readings, store them in shared state, copy the
//! whole snapshot, encode, and publish if the session is subscribed.  There
//! is no change detection and nothing is queued while the gate is closed.

use core::time::Duration;

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, MqttPort, SensorPort};
use crate::codec;
use crate::error::Result;
use crate::state::{PublishGate, SensorWriter};

/// What one tick did with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published,
    /// Session not subscribed; the document was dropped.
    Skipped,
}

pub struct TelemetryCycle<S: SensorPort> {
    sensors: S,
    writer: SensorWriter,
    gate: PublishGate,
    state_topic: String,
    period: Duration,
}

impl<S: SensorPort> TelemetryCycle<S> {
    pub fn new(
        sensors: S,
        writer: SensorWriter,
        gate: PublishGate,
        state_topic: &str,
        period: Duration,
    ) -> Self {
        Self {
            sensors,
            writer,
            gate,
            state_topic: state_topic.into(),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one cycle.  A publish failure is returned for the caller to
    /// report as a session fault; shared state is updated regardless.
    pub fn tick(
        &mut self,
        mqtt: &mut impl MqttPort,
        sink: &mut impl EventSink,
    ) -> Result<TickOutcome> {
        let readings = self.sensors.acquire();
        self.writer.update(readings);
        let snapshot = self.writer.snapshot();

        let outcome = if self.gate.is_open() {
            let body = codec::encode_to_vec(&snapshot);
            mqtt.publish(&self.state_topic, &body, false)?;
            TickOutcome::Published
        } else {
            debug!("TELEM: session not subscribed, skipping publish");
            TickOutcome::Skipped
        };

        sink.emit(&AppEvent::Telemetry {
            snapshot,
            published: outcome == TickOutcome::Published,
        });
        Ok(outcome)
    }
}
