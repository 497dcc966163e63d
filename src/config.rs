//! System configuration parameters
//!
//! All tunable parameters for the EnvNode device.
//! Defaults can be overridden at build time (`MQTT_HOST_URL`) or at runtime
//! via the NVS-backed [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Broker URL used when nothing else is configured.
pub const DEFAULT_BROKER_URL: &str = match option_env!("MQTT_HOST_URL") {
    Some(url) => url,
    None => "mqtt://homeassistant.local:1883",
};

/// Station SSID baked in at build time.  Empty means unprovisioned.
pub const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

/// Station password baked in at build time.  Empty selects an open network.
pub const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

/// Longest credential prefix that still fits `"<prefix>-<id>"` in a
/// 64-byte credential string.
pub const MAX_CREDENTIAL_PREFIX_LEN: usize = 48;

/// Metadata reported in every discovery document's `device` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        // Values already registered in existing Home Assistant installs.
        Self {
            name: "综合环境监测控制设备".into(),
            model: "6S8Y91".into(),
            manufacturer: "若甫科技有限公司".into(),
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Broker ---
    /// MQTT broker URI (`mqtt://host:port` or `mqtts://…`)
    pub broker_url: String,
    /// Prefix for client id, username and password (`<prefix>-<device id>`)
    pub credential_prefix: String,
    /// Home Assistant discovery prefix
    pub discovery_prefix: String,

    // --- Device ---
    pub device: DeviceInfo,

    // --- Timing ---
    /// Telemetry publish period (seconds)
    pub telemetry_interval_secs: u32,
    /// Fixed delay before each automatic link reconnect (milliseconds)
    pub reconnect_delay_ms: u32,

    // --- Reconnect ceiling ---
    /// Consecutive link failures after which auto-reconnect stops
    pub max_link_attempts: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            broker_url: DEFAULT_BROKER_URL.into(),
            credential_prefix: "ESP32".into(),
            discovery_prefix: "homeassistant".into(),

            device: DeviceInfo::default(),

            telemetry_interval_secs: 10,
            reconnect_delay_ms: 1000,

            max_link_attempts: 6,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.broker_url.starts_with("mqtt://") || self.broker_url.starts_with("mqtts://")) {
            return Err(ConfigError::ValidationFailed(
                "broker_url must start with mqtt:// or mqtts://",
            ));
        }
        if self.credential_prefix.is_empty()
            || self.credential_prefix.len() > MAX_CREDENTIAL_PREFIX_LEN
        {
            return Err(ConfigError::ValidationFailed(
                "credential_prefix must be 1–48 bytes",
            ));
        }
        if self.discovery_prefix.is_empty() || self.discovery_prefix.contains(['#', '+']) {
            return Err(ConfigError::ValidationFailed(
                "discovery_prefix must be non-empty and wildcard-free",
            ));
        }
        if !(1..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 1–3600",
            ));
        }
        if !(100..=60_000).contains(&self.reconnect_delay_ms) {
            return Err(ConfigError::ValidationFailed(
                "reconnect_delay_ms must be 100–60000",
            ));
        }
        if !(1..=32).contains(&self.max_link_attempts) {
            return Err(ConfigError::ValidationFailed(
                "max_link_attempts must be 1–32",
            ));
        }
        Ok(())
    }

    pub fn telemetry_period(&self) -> core::time::Duration {
        core::time::Duration::from_secs(u64::from(self.telemetry_interval_secs))
    }

    pub fn reconnect_delay(&self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.reconnect_delay_ms))
    }
}
