//! Telemetry codec.
//!
//! State document (published on the state topic):
//!
//! ```json
//! {
//!   "temperature": "23.47", "humidity": "61.02", "pressure": "1003.90",
//!   "lightIntensity": "412.77", "smokeDensity": "3.10",
//!   "relayStatus_1": 0, "relayStatus_2": 1, "relayStatus_3": 0, "relayStatus_4": 0,
//!   "circuitBreakerStatus": 1
//! }
//! ```
//!
//! Sensor values are strings with exactly two fractional digits; switch
//! states are the integers 0 and 1.  Command documents carry any subset of
//! `dalay_1..4` and `circuit_breaker` with numeric values, non-zero meaning
//! on.  Every key comes from the capability registry.

use serde_json::{Map, Value};

use crate::app::commands::CommandIntent;
use crate::capability::{CapabilityKind, CapabilityRegistry};
use crate::error::Result;
use crate::state::DeviceSnapshot;

/// Build the state document for `snapshot`.  Never fails.
pub fn encode(snapshot: &DeviceSnapshot) -> Value {
    let registry = CapabilityRegistry::standard();
    let mut doc = Map::new();

    for cap in registry.iter() {
        let value = match cap.kind {
            CapabilityKind::Sensor => cap
                .index
                .and_then(|i| snapshot.sensors.value(i))
                .map(|v| Value::String(format!("{v:.2}"))),
            CapabilityKind::Actuator => cap
                .index
                .and_then(|i| snapshot.actuators.relay(i))
                .map(switch_value),
            CapabilityKind::Breaker => Some(switch_value(snapshot.actuators.breaker)),
        };
        if let Some(value) = value {
            doc.insert(cap.key.into(), value);
        }
    }

    Value::Object(doc)
}

/// [`encode`] rendered to bytes ready for publishing.
pub fn encode_to_vec(snapshot: &DeviceSnapshot) -> Vec<u8> {
    // Serialising a `Value` built from strings and integers cannot fail.
    serde_json::to_vec(&encode(snapshot)).unwrap_or_default()
}

/// Parse a command document into a partial actuator update.
///
/// Invalid JSON is a [`MalformedPayload`](crate::error::Error::MalformedPayload)
/// error.  Valid JSON that is not an object, unknown keys, and keys whose
/// value is not a number are ignored.
pub fn decode(payload: &[u8]) -> Result<CommandIntent> {
    let doc: Value = serde_json::from_slice(payload)?;
    let mut intent = CommandIntent::default();

    let Value::Object(map) = doc else {
        return Ok(intent);
    };

    for cap in CapabilityRegistry::standard().actuators() {
        let Some(wanted) = cap
            .command_key
            .and_then(|k| map.get(k))
            .and_then(Value::as_f64)
            .map(|v| v != 0.0)
        else {
            continue;
        };

        match (cap.kind, cap.index) {
            (CapabilityKind::Actuator, Some(i)) => {
                if let Some(slot) = usize::from(i)
                    .checked_sub(1)
                    .and_then(|s| intent.relays.get_mut(s))
                {
                    *slot = Some(wanted);
                }
            }
            (CapabilityKind::Breaker, _) => intent.breaker = Some(wanted),
            _ => {}
        }
    }

    Ok(intent)
}

fn switch_value(on: bool) -> Value {
    Value::from(u8::from(on))
}
