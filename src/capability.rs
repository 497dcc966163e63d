//! Capability registry: the single description of every exposed point.
//!
//! Discovery, encode and decode are all driven from [`REGISTRY`]; no other
//! module spells a wire key.  Registration order is fixed:
//!
//! ```text
//!  idx  kind      key              command key       unit
//!  0    Sensor    temperature      -                 °C
//!  1    Sensor    humidity         -                 %
//!  2    Sensor    pressure         -                 hPa
//!  3    Sensor    lightIntensity   -                 lx
//!  4    Sensor    smokeDensity     -                 ppm
//!  1    Actuator  relayStatus_1    dalay_1           -
//!  …
//!  4    Actuator  relayStatus_4    dalay_4           -
//!  -    Breaker   circuitBreakerStatus circuit_breaker -
//! ```
//!
//! `dalay_N` is the spelling existing deployments send; it must not be
//! "corrected".

/// Number of relay channels.  Fixed for the lifetime of the process.
pub const RELAY_COUNT: usize = 4;

/// Number of sensor channels.
pub const SENSOR_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Read-only measurement.
    Sensor,
    /// Bistable relay.
    Actuator,
    /// Bistable circuit breaker.
    Breaker,
}

impl CapabilityKind {
    /// Home Assistant component this kind registers as.
    pub const fn component(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Actuator | Self::Breaker => "switch",
        }
    }

    pub const fn is_switch(self) -> bool {
        !matches!(self, Self::Sensor)
    }
}

/// Static descriptor for one exposed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Key in the published state document.
    pub key: &'static str,
    pub display_name: &'static str,
    pub unit: Option<&'static str>,
    pub kind: CapabilityKind,
    /// Sensor: 0-based channel.  Relay: 1-based channel.  Breaker: none.
    pub index: Option<u8>,
    /// Key accepted on the command topic (switches only).
    pub command_key: Option<&'static str>,
}

const fn sensor(index: u8, key: &'static str, name: &'static str, unit: &'static str) -> Capability {
    Capability {
        key,
        display_name: name,
        unit: Some(unit),
        kind: CapabilityKind::Sensor,
        index: Some(index),
        command_key: None,
    }
}

const fn relay(index: u8, key: &'static str, command_key: &'static str, name: &'static str) -> Capability {
    Capability {
        key,
        display_name: name,
        unit: None,
        kind: CapabilityKind::Actuator,
        index: Some(index),
        command_key: Some(command_key),
    }
}

/// Every capability, in registration order.
pub static REGISTRY: [Capability; SENSOR_COUNT + RELAY_COUNT + 1] = [
    sensor(0, "temperature", "温度", "°C"),
    sensor(1, "humidity", "湿度", "%"),
    sensor(2, "pressure", "气压", "hPa"),
    sensor(3, "lightIntensity", "光照", "lx"),
    sensor(4, "smokeDensity", "烟感", "ppm"),
    relay(1, "relayStatus_1", "dalay_1", "继电器 1"),
    relay(2, "relayStatus_2", "dalay_2", "继电器 2"),
    relay(3, "relayStatus_3", "dalay_3", "继电器 3"),
    relay(4, "relayStatus_4", "dalay_4", "继电器 4"),
    Capability {
        key: "circuitBreakerStatus",
        display_name: "断路器",
        unit: None,
        kind: CapabilityKind::Breaker,
        index: None,
        command_key: Some("circuit_breaker"),
    },
];

/// Read-only view over the registry.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityRegistry {
    entries: &'static [Capability],
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CapabilityRegistry {
    pub const fn standard() -> Self {
        Self { entries: &REGISTRY }
    }

    /// Every entry in registration order.
    pub fn iter(&self) -> core::slice::Iter<'static, Capability> {
        self.entries.iter()
    }

    /// Sensor channels in registration order.  Restartable: clone the
    /// iterator or call again.
    pub fn sensors(&self) -> impl Iterator<Item = &'static Capability> + Clone + use<> {
        self.entries
            .iter()
            .filter(|c| c.kind == CapabilityKind::Sensor)
    }

    /// Relays followed by the breaker, in registration order.
    pub fn actuators(&self) -> impl Iterator<Item = &'static Capability> + Clone + use<> {
        self.entries.iter().filter(|c| c.kind.is_switch())
    }

    /// Relay channels only.
    pub fn relays(&self) -> impl Iterator<Item = &'static Capability> + Clone + use<> {
        self.entries
            .iter()
            .filter(|c| c.kind == CapabilityKind::Actuator)
    }

    /// The breaker channel.
    pub fn breaker(&self) -> Option<&'static Capability> {
        self.entries
            .iter()
            .find(|c| c.kind == CapabilityKind::Breaker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
