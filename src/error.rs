//! Unified error types for the EnvNode firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! supervisor's fault handling uniform.  All variants are `Copy` so they can
//! be carried inside [`SessionEvent`](crate::events::SessionEvent)s and
//! [`AppEvent`](crate::app::events::AppEvent)s without allocation.
//!
//! Nothing here is process-fatal: every variant degrades to "stop publishing
//! until the session is re-established".

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Inbound command bytes were not valid JSON.  The message is dropped
    /// and no state changes.
    MalformedPayload { line: usize, column: usize },
    /// A publish or subscribe failed.  Treated as a session fault.
    Transport(TransportError),
    /// The network link failed.  Drives reconnect-attempt counting.
    Link(LinkError),
    /// Automatic link reconnects hit the ceiling.  Telemetry keeps running
    /// locally; nothing is published until an external restart.
    ReconnectExhausted { attempts: u8 },
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload { line, column } => {
                write!(f, "malformed payload at {line}:{column}")
            }
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::ReconnectExhausted { attempts } => {
                write!(f, "reconnect exhausted after {attempts} attempts")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedPayload {
            line: e.line(),
            column: e.column(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    PublishFailed,
    SubscribeFailed,
    /// The broker client has not been created or was torn down.
    NotConnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::NotConnected => write!(f, "MQTT client not connected"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    ConnectFailed,
    Dropped,
    NoCredentials,
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open network) or 8-64 bytes.
    InvalidPassword,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "WiFi connect failed"),
            Self::Dropped => write!(f, "WiFi link dropped"),
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
