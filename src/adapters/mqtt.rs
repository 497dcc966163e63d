//! MQTT broker adapter.
//!
//! [`SharedMqtt`] implements [`MqttPort`] over an `EspMqttClient` shared by
//! the supervisor and telemetry threads.  The connection half is drained by
//! a dedicated pump thread that turns client events into
//! [`SessionEvent`]s:
//!
//! | Client event   | Session event                  |
//! |----------------|--------------------------------|
//! | `Connected`    | `BrokerConnected`              |
//! | `Disconnected` | `BrokerDisconnected`           |
//! | `Subscribed`   | `SubscribeAck`                 |
//! | `Published`    | logged at debug, not forwarded |
//! | `Received`     | `Message` (complete only)      |
//! | `Error`        | logged, the client reconnects  |

use log::{debug, warn};

use crate::events::{MAX_PAYLOAD_BYTES, SessionEvent};

#[cfg(target_os = "espidf")]
pub use esp::{SharedMqtt, connect, spawn_pump};

/// Client notifications that carry no message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientNotice {
    Connected,
    Disconnected,
    Subscribed,
    /// A QoS 1 publish was acknowledged.
    Published(u32),
}

/// Session event for a client notification.  Publish acks are logged and
/// go no further.
pub fn notice(kind: ClientNotice) -> Option<SessionEvent> {
    match kind {
        ClientNotice::Connected => Some(SessionEvent::BrokerConnected),
        ClientNotice::Disconnected => Some(SessionEvent::BrokerDisconnected),
        ClientNotice::Subscribed => Some(SessionEvent::SubscribeAck),
        ClientNotice::Published(id) => {
            debug!("MQTT: publish {} acknowledged", id);
            None
        }
    }
}

/// Wrap one complete inbound publish, dropping anything the event buffers
/// cannot hold.
pub fn inbound(topic: &str, data: &[u8]) -> Option<SessionEvent> {
    if data.len() > MAX_PAYLOAD_BYTES {
        warn!(
            "MQTT: dropping oversized payload on {} ({} bytes)",
            topic,
            data.len()
        );
        return None;
    }
    let event = SessionEvent::message(topic, data);
    if event.is_none() {
        warn!("MQTT: dropping message, topic too long: {}", topic);
    }
    event
}

#[cfg(target_os = "espidf")]
mod esp {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;

    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
    };
    use esp_idf_svc::sys::EspError;
    use log::{debug, info, warn};

    use crate::app::ports::MqttPort;
    use crate::error::{Result, TransportError};
    use crate::events::{self, SessionEvents};
    use crate::identity::DeviceIdentity;

    use super::ClientNotice;

    const PUMP_STACK_SIZE: usize = 12 * 1024;

    /// Client handle shared between threads.  Cloning shares the client.
    #[derive(Clone)]
    pub struct SharedMqtt {
        client: Arc<Mutex<EspMqttClient<'static>>>,
        connected: Arc<AtomicBool>,
    }

    /// Create the client.  The ESP-IDF client connects and reconnects in
    /// the background; progress arrives through the pump.
    pub fn connect(
        url: &str,
        identity: &DeviceIdentity,
    ) -> core::result::Result<(SharedMqtt, EspMqttConnection), EspError> {
        let conf = MqttClientConfiguration {
            client_id: Some(identity.client_id()),
            username: Some(identity.username()),
            password: Some(identity.password()),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(url, &conf)?;
        info!("MQTT: client created for {} as {}", url, identity.client_id());
        Ok((
            SharedMqtt {
                client: Arc::new(Mutex::new(client)),
                connected: Arc::new(AtomicBool::new(false)),
            },
            conn,
        ))
    }

    /// Drain the connection on its own thread, forwarding into `events`.
    pub fn spawn_pump(
        mut conn: EspMqttConnection,
        mqtt: &SharedMqtt,
        events: &'static SessionEvents,
    ) -> std::io::Result<()> {
        let connected = Arc::clone(&mqtt.connected);
        thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(PUMP_STACK_SIZE)
            .spawn(move || {
                while let Ok(event) = conn.next() {
                    let forwarded = match event.payload() {
                        EventPayload::Connected(_) => {
                            connected.store(true, Ordering::Release);
                            super::notice(ClientNotice::Connected)
                        }
                        EventPayload::Disconnected => {
                            connected.store(false, Ordering::Release);
                            super::notice(ClientNotice::Disconnected)
                        }
                        EventPayload::Subscribed(_) => super::notice(ClientNotice::Subscribed),
                        EventPayload::Published(id) => super::notice(ClientNotice::Published(id)),
                        EventPayload::Received {
                            topic: Some(topic),
                            data,
                            details: Details::Complete,
                            ..
                        } => super::inbound(topic, data),
                        EventPayload::Received { .. } => {
                            warn!("MQTT: dropping fragmented or topic-less message");
                            None
                        }
                        EventPayload::Error(e) => {
                            warn!("MQTT: client error: {:?}", e);
                            None
                        }
                        other => {
                            debug!("MQTT: {:?}", other);
                            None
                        }
                    };
                    if let Some(event) = forwarded {
                        events::post(events, event);
                    }
                }
                warn!("MQTT: connection closed, pump exiting");
            })
            .map(|_| ())
    }

    impl MqttPort for SharedMqtt {
        fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<()> {
            let mut client = self
                .client
                .lock()
                .map_err(|_| TransportError::NotConnected)?;
            client
                .publish(topic, QoS::AtLeastOnce, retain, payload)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: publish to {} failed: {}", topic, e);
                    TransportError::PublishFailed.into()
                })
        }

        fn subscribe(&mut self, topic: &str) -> Result<()> {
            let mut client = self
                .client
                .lock()
                .map_err(|_| TransportError::NotConnected)?;
            client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: subscribe to {} failed: {}", topic, e);
                    TransportError::SubscribeFailed.into()
                })
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Acquire)
        }
    }
}
