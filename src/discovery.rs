//! Home Assistant discovery registration.
//!
//! One retained document per registry entry, published to
//! `<discovery_prefix>/<sensor|switch>/<unique_id>/config` each time a
//! broker session is established.  Failures are returned to the caller
//! unchanged; there is no retry here.

use log::{debug, info};
use serde::Serialize;

use crate::app::ports::MqttPort;
use crate::capability::{Capability, CapabilityKind, CapabilityRegistry};
use crate::config::{DeviceInfo, SystemConfig};
use crate::error::Result;
use crate::identity::DeviceIdentity;

/// Switch payloads are JSON numbers, matching the state document.
const PAYLOAD_ON: u8 = 1;
const PAYLOAD_OFF: u8 = 0;

/// The `device` block shared by every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub identifiers: Vec<String>,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

/// One discovery config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryDocument {
    pub name: String,
    pub unique_id: String,
    pub state_topic: String,
    pub value_template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<u8>,

    pub device: DeviceDescriptor,
}

/// A document together with the topic it is published on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub topic: String,
    pub document: DiscoveryDocument,
}

impl Registration {
    pub fn payload(&self) -> Vec<u8> {
        // Plain strings and a string vector; serialisation cannot fail.
        serde_json::to_vec(&self.document).unwrap_or_default()
    }
}

/// Builds and publishes the registration set for one device.
#[derive(Debug, Clone)]
pub struct DiscoveryPublisher {
    object_id: String,
    state_topic: String,
    command_topic: String,
    prefix: String,
    device: DeviceInfo,
    registry: CapabilityRegistry,
}

impl DiscoveryPublisher {
    pub fn new(identity: &DeviceIdentity, config: &SystemConfig) -> Self {
        Self {
            object_id: identity.object_id().into(),
            state_topic: identity.state_topic().into(),
            command_topic: identity.command_topic().into(),
            prefix: config.discovery_prefix.clone(),
            device: config.device.clone(),
            registry: CapabilityRegistry::standard(),
        }
    }

    /// Every registration, in registry order.
    pub fn registrations(&self) -> impl Iterator<Item = Registration> + '_ {
        self.registry.iter().map(|cap| self.registration(cap))
    }

    /// Publish every registration, retained.  Stops at the first failure.
    /// Returns the number of documents published.
    pub fn publish_all(&self, mqtt: &mut impl MqttPort) -> Result<usize> {
        let mut count = 0;
        for reg in self.registrations() {
            mqtt.publish(&reg.topic, &reg.payload(), true)?;
            debug!("DISCOVERY: registered {}", reg.document.unique_id);
            count += 1;
        }
        info!("DISCOVERY: {} entities registered", count);
        Ok(count)
    }

    fn registration(&self, cap: &Capability) -> Registration {
        let unique_id = self.unique_id(cap);
        let topic = format!(
            "{}/{}/{}/config",
            self.prefix,
            cap.kind.component(),
            unique_id
        );

        let command = cap.command_key.map(|key| {
            (
                self.command_topic.clone(),
                format!("{{ \"{key}\": {{{{ value }}}} }}"),
            )
        });
        let (command_topic, command_template) = command.unzip();
        let switch = cap.kind.is_switch();

        let document = DiscoveryDocument {
            name: cap.display_name.into(),
            unique_id,
            state_topic: self.state_topic.clone(),
            value_template: format!("{{{{ value_json.{} }}}}", cap.key),
            unit_of_measurement: cap.unit.map(Into::into),
            command_topic,
            command_template,
            payload_on: switch.then_some(PAYLOAD_ON),
            payload_off: switch.then_some(PAYLOAD_OFF),
            device: DeviceDescriptor {
                identifiers: vec![self.object_id.clone()],
                name: self.device.name.clone(),
                model: self.device.model.clone(),
                manufacturer: self.device.manufacturer.clone(),
            },
        };

        Registration { topic, document }
    }

    fn unique_id(&self, cap: &Capability) -> String {
        let stem = &self.object_id;
        match (cap.kind, cap.index) {
            (CapabilityKind::Sensor, Some(i)) => format!("{stem}_sensor{i}"),
            (CapabilityKind::Actuator, Some(i)) => format!("{stem}_relay_{i}"),
            _ => format!("{stem}_circuit_breaker"),
        }
    }
}
