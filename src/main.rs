//! EnvNode firmware entry point
//!
//! Hexagonal architecture with two execution contexts joined by one event
//! channel and one shared snapshot.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter   SharedMqtt + pump   NvsAdapter   LogEventSink   │
//! │  (LinkPort)    (MqttPort)          (ConfigPort) (EventSink)    │
//! │  SensorHub (SensorPort)                                        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐   │
//! │  │ SyncService (main thread)│   │ TelemetryCycle (thread)  │   │
//! │  │ Supervisor · Discovery   │   │ acquire · encode · send  │   │
//! │  └────────────▲─────────────┘   └────────────┬─────────────┘   │
//! │               │        SESSION_EVENTS        │ faults          │
//! │               └──────────────────────────────┘                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::thread;

use anyhow::{Context, Result, bail};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use futures_lite::future::block_on;
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use envnode::adapters::device_id;
use envnode::adapters::log_sink::LogEventSink;
use envnode::adapters::mqtt;
use envnode::adapters::nvs::NvsAdapter;
use envnode::adapters::wifi::WifiAdapter;
use envnode::app::ports::ConfigPort;
use envnode::app::service::SyncService;
use envnode::config::{self, SystemConfig};
use envnode::events::{self, SESSION_EVENTS, SessionEvent};
use envnode::identity::DeviceIdentity;
use envnode::sensors::SensorHub;
use envnode::state::{self, DeviceSnapshot, PublishGate};
use envnode::telemetry::TelemetryCycle;

const TELEMETRY_STACK_SIZE: usize = 12 * 1024;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EnvNode v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new().map_err(|e| anyhow::anyhow!("NVS init failed: {e}"))?;
    let config = load_config(&nvs);

    // ── 3. Identity ───────────────────────────────────────────
    let identity = DeviceIdentity::resolve(&device_id::read_mac(), &config.credential_prefix);
    info!("Device id {} (state topic {})", identity.id(), identity.state_topic());

    // ── 4. Network link ───────────────────────────────────────
    if config::WIFI_SSID.is_empty() {
        bail!("no WiFi SSID configured; rebuild with WIFI_SSID set");
    }
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs_partition, &SESSION_EVENTS)?;
    wifi.set_credentials(config::WIFI_SSID, config::WIFI_PASSWORD)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    wifi.start().map_err(|e| anyhow::anyhow!("{e}"))?;

    // ── 5. Broker client + pump ───────────────────────────────
    let (mut broker, conn) = mqtt::connect(&config.broker_url, &identity)?;
    mqtt::spawn_pump(conn, &broker, &SESSION_EVENTS).context("spawning MQTT pump")?;

    // ── 6. Shared state ───────────────────────────────────────
    let (sensor_writer, actuator_writer) = state::split(DeviceSnapshot::default());
    let gate = PublishGate::new();

    // ── 7. Telemetry context ──────────────────────────────────
    let mut cycle = TelemetryCycle::new(
        SensorHub::new(StdRng::from_entropy()),
        sensor_writer,
        gate.clone(),
        identity.state_topic(),
        config.telemetry_period(),
    );
    let mut telemetry_mqtt = broker.clone();
    thread::Builder::new()
        .name("telemetry".into())
        .stack_size(TELEMETRY_STACK_SIZE)
        .spawn(move || {
            let mut sink = LogEventSink::new();
            loop {
                thread::sleep(cycle.period());
                if let Err(e) = cycle.tick(&mut telemetry_mqtt, &mut sink) {
                    events::post(&SESSION_EVENTS, SessionEvent::TransportError(e));
                }
            }
        })
        .context("spawning telemetry thread")?;

    // ── 8. Network-event context ──────────────────────────────
    let mut sink = LogEventSink::new();
    let mut service = SyncService::new(&config, identity, actuator_writer, gate);
    service.start(&mut sink);

    info!("System ready. Entering event loop.");
    loop {
        let event = block_on(SESSION_EVENTS.receive());
        service.handle_event(event, &mut broker, &mut wifi, &mut sink);
    }
}

/// Stored config with build-time overrides applied.  Anything invalid
/// falls back to the compiled defaults.
fn load_config(nvs: &NvsAdapter) -> SystemConfig {
    let mut config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    if option_env!("MQTT_HOST_URL").is_some() {
        config.broker_url = config::DEFAULT_BROKER_URL.into();
    }
    if let Err(e) = config.validate() {
        error!("Config invalid ({}), using defaults", e);
        return SystemConfig::default();
    }
    config
}
