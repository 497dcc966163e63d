//! Synchronisation service, the hexagonal core of the network-event context.
//!
//! [`SyncService`] owns the connection [`Supervisor`], the discovery
//! publisher and the actuator side of shared state.  It feeds each
//! [`SessionEvent`] through the supervisor, executes the resulting
//! [`Action`]s against the ports, and turns port failures back into
//! session events so the supervisor sees every fault.
//!
//! ```text
//!  SessionEvent ──▶ ┌────────────────────────────┐ ──▶ MqttPort
//!                   │        SyncService         │ ──▶ LinkPort
//!  feedback ◀────── │ Supervisor · Discovery · Δ │ ──▶ EventSink
//!                   └────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::codec;
use crate::config::SystemConfig;
use crate::discovery::DiscoveryPublisher;
use crate::error::Error;
use crate::events::SessionEvent;
use crate::identity::DeviceIdentity;
use crate::session::{Action, Phase, Supervisor};
use crate::state::{ActuatorWriter, PublishGate};

use super::events::AppEvent;
use super::ports::{EventSink, LinkPort, MqttPort};

// ───────────────────────────────────────────────────────────────
// SyncService
// ───────────────────────────────────────────────────────────────

pub struct SyncService {
    supervisor: Supervisor,
    discovery: DiscoveryPublisher,
    identity: DeviceIdentity,
    actuators: ActuatorWriter,
    gate: PublishGate,
}

impl SyncService {
    /// Build the service.  `gate` is the handle the telemetry context
    /// reads; this service is the only one that opens or closes it.
    pub fn new(
        config: &SystemConfig,
        identity: DeviceIdentity,
        actuators: ActuatorWriter,
        gate: PublishGate,
    ) -> Self {
        let supervisor = Supervisor::new(
            identity.command_topic(),
            config.max_link_attempts,
            config.reconnect_delay(),
        );
        let discovery = DiscoveryPublisher::new(&identity, config);
        gate.set(false);
        Self {
            supervisor,
            discovery,
            identity,
            actuators,
            gate,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let mut device_id = heapless::String::new();
        // Both sides are 12 bytes; cannot overflow.
        let _ = device_id.push_str(self.identity.id());
        sink.emit(&AppEvent::Started { device_id });
        info!(
            "SyncService started for {} in {:?}",
            self.identity.id(),
            self.supervisor.phase()
        );
    }

    // ── Event handling ────────────────────────────────────────

    /// Process one session event to completion, including any faults the
    /// resulting port calls feed back.
    pub fn handle_event(
        &mut self,
        event: SessionEvent,
        mqtt: &mut impl MqttPort,
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            next = self.step(&event, mqtt, link, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.supervisor.phase()
    }

    pub fn reconnect_attempts(&self) -> u8 {
        self.supervisor.reconnect_attempts()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    // ── Internal ──────────────────────────────────────────────

    /// One pass through the supervisor.  Returns a feedback event when an
    /// action failed; remaining actions of this pass are then abandoned.
    fn step(
        &mut self,
        event: &SessionEvent,
        mqtt: &mut impl MqttPort,
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) -> Option<SessionEvent> {
        let from = self.supervisor.phase();
        let actions = self.supervisor.handle(event);
        let to = self.supervisor.phase();

        if from != to {
            sink.emit(&AppEvent::PhaseChanged { from, to });
        }
        self.gate.set(self.supervisor.is_subscribed());

        for action in actions {
            if let Some(feedback) = self.execute(action, mqtt, link, sink) {
                return Some(feedback);
            }
        }
        None
    }

    fn execute(
        &mut self,
        action: Action,
        mqtt: &mut impl MqttPort,
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) -> Option<SessionEvent> {
        match action {
            Action::CheckBroker => {
                // Link came back under a live client: no connect event will follow.
                mqtt.is_connected().then_some(SessionEvent::BrokerConnected)
            }
            Action::PublishDiscovery => match self.discovery.publish_all(mqtt) {
                Ok(count) => {
                    sink.emit(&AppEvent::DiscoveryPublished { count });
                    None
                }
                Err(e) => Some(fault(e, sink)),
            },
            Action::Subscribe => match mqtt.subscribe(self.identity.command_topic()) {
                Ok(()) => {
                    debug!("SESSION: subscribe sent for {}", self.identity.command_topic());
                    None
                }
                Err(e) => Some(fault(e, sink)),
            },
            Action::HandleCommand(payload) => self.handle_command(&payload, mqtt, sink),
            Action::Reconnect { after } => {
                sink.emit(&AppEvent::ReconnectScheduled {
                    attempt: self.supervisor.reconnect_attempts(),
                    after,
                });
                match link.reconnect(after) {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("LINK: reconnect request failed: {}", e);
                        Some(SessionEvent::LinkDown)
                    }
                }
            }
            Action::ReconnectExhausted { attempts } => {
                warn!("LINK: giving up after {} attempts", attempts);
                sink.emit(&AppEvent::SessionFault(Error::ReconnectExhausted { attempts }));
                None
            }
        }
    }

    /// Decode, apply, and immediately publish the resulting state.
    fn handle_command(
        &mut self,
        payload: &[u8],
        mqtt: &mut impl MqttPort,
        sink: &mut impl EventSink,
    ) -> Option<SessionEvent> {
        let intent = match codec::decode(payload) {
            Ok(intent) => intent,
            Err(e) => {
                warn!("CMD: rejected: {}", e);
                sink.emit(&AppEvent::CommandRejected(e));
                // State is unchanged; no echo.
                return None;
            }
        };

        let state = self.actuators.apply(&intent);
        sink.emit(&AppEvent::CommandApplied { intent, state });

        let body = codec::encode_to_vec(&self.actuators.snapshot());
        match mqtt.publish(self.identity.state_topic(), &body, false) {
            Ok(()) => None,
            Err(e) => Some(fault(e, sink)),
        }
    }
}

fn fault(e: Error, sink: &mut impl EventSink) -> SessionEvent {
    warn!("SESSION: fault: {}", e);
    sink.emit(&AppEvent::SessionFault(e));
    SessionEvent::TransportError(e)
}
