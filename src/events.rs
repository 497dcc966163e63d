//! Session events and the channel that carries them.
//!
//! Events are produced by:
//! - the Wi-Fi adapter (link up / link down)
//! - the MQTT connection pump (broker connect, subscribe acks, inbound messages)
//! - the telemetry thread (publish failures)
//!
//! and consumed one at a time by the supervisor thread, which feeds them to
//! [`SyncService::handle_event`](crate::app::service::SyncService::handle_event).
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ Wi-Fi       │────▶│                  │     │                  │
//! │ MQTT pump   │────▶│  SESSION_EVENTS  │────▶│ supervisor loop  │
//! │ Telemetry   │────▶│  (bounded, 16)   │     │ (single consumer)│
//! └─────────────┘     └──────────────────┘     └──────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::error::Error;

/// Largest inbound message the device accepts.  Bigger command payloads
/// are dropped at the pump.
pub const MAX_PAYLOAD_BYTES: usize = 512;

/// Pending events before producers start dropping.
const EVENT_DEPTH: usize = 16;

/// Inbound topic buffer.
pub type EventTopic = heapless::String<64>;

/// Inbound payload buffer.
pub type EventPayload = heapless::Vec<u8, MAX_PAYLOAD_BYTES>;

/// Everything that can move the connection supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The network interface obtained an address.
    LinkUp,
    /// The network interface lost its association.
    LinkDown,
    /// The broker accepted the session.
    BrokerConnected,
    /// The broker session closed while the link may still be up.
    BrokerDisconnected,
    /// The command-topic subscription was acknowledged.
    SubscribeAck,
    /// An inbound publish.
    Message {
        topic: EventTopic,
        payload: EventPayload,
    },
    /// A publish or subscribe failed outside the supervisor thread.
    TransportError(Error),
}

impl SessionEvent {
    /// Build a `Message`, or `None` when topic or payload exceed the
    /// buffers.
    pub fn message(topic: &str, payload: &[u8]) -> Option<Self> {
        let topic = EventTopic::try_from(topic).ok()?;
        let payload = EventPayload::from_slice(payload).ok()?;
        Some(Self::Message { topic, payload })
    }
}

/// Channel type, so tests can build their own instance.
pub type SessionEvents = Channel<CriticalSectionRawMutex, SessionEvent, EVENT_DEPTH>;

/// Process-wide event channel: adapters and telemetry → supervisor loop.
pub static SESSION_EVENTS: SessionEvents = Channel::new();

/// Queue `event` without blocking.  Returns `false` (and logs) if the
/// channel is full.
pub fn post(channel: &SessionEvents, event: SessionEvent) -> bool {
    match channel.try_send(event) {
        Ok(()) => true,
        Err(embassy_sync::channel::TrySendError::Full(dropped)) => {
            warn!("Session event dropped, queue full: {:?}", dropped);
            false
        }
    }
}
