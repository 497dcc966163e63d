//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`], the hexagonal boundary for network
//! connectivity, and forwards driver events into the session channel:
//!
//! | Driver event                 | Session event          |
//! |------------------------------|------------------------|
//! | `WifiEvent::StaDisconnected` | `SessionEvent::LinkDown` |
//! | `IpEvent::DhcpIpAssigned`    | `SessionEvent::LinkUp`   |
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation backend for host-side tests.
//!
//! ## Reconnection policy
//!
//! The adapter never retries on its own.  The supervisor decides whether
//! to call [`LinkPort::reconnect`], which waits the fixed delay and issues
//! exactly one connect attempt.

use core::time::Duration;

use log::info;

use crate::app::ports::LinkPort;
use crate::error::{LinkError, Result};
use crate::events::{self, SessionEvent, SessionEvents};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::{EspSubscription, EspSystemEventLoop, System},
    hal::modem::Modem,
    netif::IpEvent,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi, WifiEvent},
};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> core::result::Result<(), LinkError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(LinkError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> core::result::Result<(), LinkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(LinkError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    events: &'static SessionEvents,

    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    _subscriptions: [EspSubscription<'static, System>; 2],

    /// Simulation: remaining connect attempts that should fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_connect_calls: u32,
}

impl WifiAdapter {
    /// Bring up the driver and subscribe to its events.  Does not connect.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        events: &'static SessionEvents,
    ) -> core::result::Result<Self, esp_idf_svc::sys::EspError> {
        let wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;

        let link_down = sysloop.subscribe::<WifiEvent, _>(move |event| {
            if let WifiEvent::StaDisconnected(_) = event {
                events::post(events, SessionEvent::LinkDown);
            }
        })?;
        let link_up = sysloop.subscribe::<IpEvent, _>(move |event| {
            if let IpEvent::DhcpIpAssigned(_) = event {
                events::post(events, SessionEvent::LinkUp);
            }
        })?;

        Ok(Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            events,
            wifi,
            _subscriptions: [link_down, link_up],
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(events: &'static SessionEvents) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            events,
            sim_failures: 0,
            sim_connected: false,
            sim_connect_calls: 0,
        }
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<()> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| LinkError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| LinkError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Configure the station, start the driver and issue the first connect.
    /// The outcome arrives later as `LinkUp` or `LinkDown`.
    pub fn start(&mut self) -> Result<()> {
        if self.ssid.is_empty() {
            return Err(LinkError::NoCredentials.into());
        }
        self.platform_start()?;
        info!("WiFi: started, connecting to '{}'", self.ssid);
        self.platform_connect()
    }

    pub fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<()> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| LinkError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| LinkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.wifi
            .set_configuration(&config)
            .and_then(|()| self.wifi.start())
            .map_err(|e| {
                log::error!("WiFi: driver start failed: {}", e);
                LinkError::ConnectFailed.into()
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<()> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<()> {
        self.wifi.connect().map_err(|e| {
            log::warn!("WiFi: connect request rejected: {}", e);
            LinkError::ConnectFailed.into()
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<()> {
        self.sim_connect_calls += 1;
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            self.sim_connected = false;
            log::warn!("WiFi(sim): simulated association failure");
            events::post(self.events, SessionEvent::LinkDown);
        } else {
            self.sim_connected = true;
            info!("WiFi(sim): connected to '{}'", self.ssid);
            events::post(self.events, SessionEvent::LinkUp);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures = n;
    }

    /// Drop the association as if the AP went away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim_connected = false;
        events::post(self.events, SessionEvent::LinkDown);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connect_calls(&self) -> u32 {
        self.sim_connect_calls
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn reconnect(&mut self, after: Duration) -> Result<()> {
        std::thread::sleep(after);
        if self.is_connected() {
            // Association survived; only the session above it failed.
            events::post(self.events, SessionEvent::LinkUp);
            return Ok(());
        }
        info!("WiFi: reconnecting to '{}'", self.ssid);
        self.platform_connect()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
