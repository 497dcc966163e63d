//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SyncService / TelemetryCycle (domain)
//! ```
//!
//! Driven adapters (broker client, Wi-Fi link, sensors, event sinks,
//! storage) implement these traits.  The domain consumes them via
//! generics, so the core never touches the network stack directly and every
//! path runs against mocks on the host.
//!
//! ## Notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - Transport errors are typed; the service turns every one of them into
//!   a session fault.

use core::time::Duration;

use crate::config::SystemConfig;
use crate::error::Result;
use crate::state::SensorReadings;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the telemetry cycle calls this once per period.
pub trait SensorPort {
    /// Acquire every channel.  Implementations return finite values.
    fn acquire(&mut self) -> SensorReadings;
}

// ───────────────────────────────────────────────────────────────
// MQTT port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Broker session operations the domain needs.
///
/// Adapters pick the QoS: publishes go out at-least-once, the command
/// subscription is at-most-once.
pub trait MqttPort {
    /// Publish `payload` on `topic`.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<()>;

    /// Subscribe to `topic`.  The acknowledgement arrives later as a
    /// [`SessionEvent::SubscribeAck`](crate::events::SessionEvent::SubscribeAck).
    fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Whether the broker session is currently up.  Used when the link
    /// comes back while the client never lost its session.
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → network interface)
// ───────────────────────────────────────────────────────────────

/// Network-interface control.  Link up/down notifications travel the other
/// way, as session events.
pub trait LinkPort {
    /// Wait `after`, then start a new connection attempt.  Returns once the
    /// attempt has been issued, not when it completes.
    fn reconnect(&mut self, after: Duration) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> core::result::Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> core::result::Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Config("not found"),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::IoError => Self::Config("storage I/O"),
        }
    }
}
