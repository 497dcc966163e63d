//! Device identity and every string derived from it.
//!
//! The identity is the 6-byte station MAC rendered as 12 uppercase hex
//! digits without separators (e.g. `AABBCCDDEEFF`).  Topics, credentials and
//! the discovery object id are pure functions of that identity and are
//! computed exactly once, here, at startup.
//!
//! Client id, username and password all use the same `"<prefix>-<id>"`
//! template and are therefore identical.  Existing broker ACLs rely on that,
//! so the three fields are kept separate but equal.

use core::fmt::Write;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// `AABBCCDDEEFF`: exactly 12 characters.
pub type DeviceId = heapless::String<12>;

/// Topic or credential string.  64 bytes matches the broker-side limit the
/// deployed devices were provisioned with.
pub type Topic = heapless::String<64>;

const STATE_TOPIC_PREFIX: &str = "home/device/";
const STATE_TOPIC_SUFFIX: &str = "/state";
const COMMAND_TOPIC_SUFFIX: &str = "/set";

/// Read-only identity bundle shared by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    id: DeviceId,
    client_id: Topic,
    username: Topic,
    password: Topic,
    state_topic: Topic,
    command_topic: Topic,
    object_id: heapless::String<24>,
}

impl DeviceIdentity {
    /// Derive the identity and all templated strings from a MAC address.
    ///
    /// `credential_prefix` is validated by
    /// [`SystemConfig::validate`](crate::config::SystemConfig::validate) to
    /// fit the credential buffers.
    pub fn resolve(mac: &MacAddress, credential_prefix: &str) -> Self {
        let id = device_id(mac);

        let credential = || {
            let mut s = Topic::new();
            let _ = write!(s, "{}-{}", credential_prefix, id);
            s
        };

        let mut state_topic = Topic::new();
        let _ = write!(state_topic, "{STATE_TOPIC_PREFIX}{id}{STATE_TOPIC_SUFFIX}");
        let mut command_topic = Topic::new();
        let _ = write!(command_topic, "{STATE_TOPIC_PREFIX}{id}{COMMAND_TOPIC_SUFFIX}");
        let mut object_id = heapless::String::new();
        let _ = write!(object_id, "device_{id}");

        Self {
            client_id: credential(),
            username: credential(),
            password: credential(),
            state_topic,
            command_topic,
            object_id,
            id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// `home/device/<id>/state`
    pub fn state_topic(&self) -> &str {
        &self.state_topic
    }

    /// `home/device/<id>/set`
    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    /// `device_<id>`: the discovery `identifiers` entry and unique-id stem.
    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

/// Render a MAC as 12 uppercase hex digits.
pub fn device_id(mac: &MacAddress) -> DeviceId {
    let mut id = DeviceId::new();
    for byte in mac {
        let _ = write!(id, "{:02X}", byte);
    }
    id
}
