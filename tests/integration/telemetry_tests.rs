//! Telemetry cycle gated by the session, sharing state with commands.

use core::time::Duration;

use crate::mock_ports::{MockLink, MockMqtt, RecordingSink};

use envnode::app::events::AppEvent;
use envnode::app::ports::SensorPort;
use envnode::app::service::SyncService;
use envnode::config::SystemConfig;
use envnode::events::SessionEvent;
use envnode::identity::DeviceIdentity;
use envnode::state::{self, DeviceSnapshot, PublishGate, SensorReadings};
use envnode::telemetry::{TelemetryCycle, TickOutcome};

const STATE_TOPIC: &str = "home/device/AABBCCDDEEFF/state";

/// Steps temperature by one degree per acquisition.
struct Ramp(f32);

impl SensorPort for Ramp {
    fn acquire(&mut self) -> SensorReadings {
        self.0 += 1.0;
        SensorReadings {
            temperature: self.0,
            light_intensity: 123.456,
            ..SensorReadings::default()
        }
    }
}

fn setup() -> (SyncService, TelemetryCycle<Ramp>) {
    let identity = DeviceIdentity::resolve(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF], "ESP32");
    let (sensors, actuators) = state::split(DeviceSnapshot::default());
    let gate = PublishGate::new();
    let cycle = TelemetryCycle::new(
        Ramp(20.0),
        sensors,
        gate.clone(),
        identity.state_topic(),
        Duration::from_secs(10),
    );
    let service = SyncService::new(&SystemConfig::default(), identity, actuators, gate);
    (service, cycle)
}

fn feed(svc: &mut SyncService, mqtt: &mut MockMqtt, event: SessionEvent) {
    let mut link = MockLink::new();
    let mut sink = RecordingSink::new();
    svc.handle_event(event, mqtt, &mut link, &mut sink);
}

#[test]
fn nothing_is_published_before_subscribe() {
    let (mut svc, mut cycle) = setup();
    let mut mqtt = MockMqtt::new();
    let mut sink = RecordingSink::new();

    assert_eq!(cycle.tick(&mut mqtt, &mut sink).unwrap(), TickOutcome::Skipped);

    feed(&mut svc, &mut mqtt, SessionEvent::LinkUp);
    mqtt.connected = true;
    feed(&mut svc, &mut mqtt, SessionEvent::BrokerConnected);
    assert_eq!(cycle.tick(&mut mqtt, &mut sink).unwrap(), TickOutcome::Skipped);
    assert_eq!(mqtt.on_topic(STATE_TOPIC).count(), 0);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Telemetry { published: false, .. })),
        2
    );
}

#[test]
fn subscribed_session_receives_every_tick() {
    let (mut svc, mut cycle) = setup();
    let mut mqtt = MockMqtt::new();
    let mut sink = RecordingSink::new();

    feed(&mut svc, &mut mqtt, SessionEvent::LinkUp);
    mqtt.connected = true;
    feed(&mut svc, &mut mqtt, SessionEvent::BrokerConnected);
    feed(&mut svc, &mut mqtt, SessionEvent::SubscribeAck);

    for _ in 0..3 {
        assert_eq!(cycle.tick(&mut mqtt, &mut sink).unwrap(), TickOutcome::Published);
    }
    assert_eq!(mqtt.on_topic(STATE_TOPIC).count(), 3);

    let doc = mqtt.last_json(STATE_TOPIC).unwrap();
    assert_eq!(doc["temperature"], "23.00");
    assert_eq!(doc["lightIntensity"], "123.46");
}

#[test]
fn telemetry_carries_commanded_actuators() {
    let (mut svc, mut cycle) = setup();
    let mut mqtt = MockMqtt::new();
    let mut sink = RecordingSink::new();

    feed(&mut svc, &mut mqtt, SessionEvent::LinkUp);
    mqtt.connected = true;
    feed(&mut svc, &mut mqtt, SessionEvent::BrokerConnected);
    feed(&mut svc, &mut mqtt, SessionEvent::SubscribeAck);
    let cmd = SessionEvent::message(
        "home/device/AABBCCDDEEFF/set",
        br#"{"dalay_3":1,"circuit_breaker":1}"#,
    );
    feed(&mut svc, &mut mqtt, cmd.unwrap());

    cycle.tick(&mut mqtt, &mut sink).unwrap();
    let doc = mqtt.last_json(STATE_TOPIC).unwrap();
    assert_eq!(doc["relayStatus_3"], 1);
    assert_eq!(doc["circuitBreakerStatus"], 1);
}

#[test]
fn gate_closes_when_link_drops() {
    let (mut svc, mut cycle) = setup();
    let mut mqtt = MockMqtt::new();
    let mut sink = RecordingSink::new();

    feed(&mut svc, &mut mqtt, SessionEvent::LinkUp);
    mqtt.connected = true;
    feed(&mut svc, &mut mqtt, SessionEvent::BrokerConnected);
    feed(&mut svc, &mut mqtt, SessionEvent::SubscribeAck);
    feed(&mut svc, &mut mqtt, SessionEvent::LinkDown);

    assert_eq!(cycle.tick(&mut mqtt, &mut sink).unwrap(), TickOutcome::Skipped);
}

#[test]
fn publish_failure_feeds_back_as_transport_error() {
    let (mut svc, mut cycle) = setup();
    let mut mqtt = MockMqtt::new();
    let mut sink = RecordingSink::new();

    feed(&mut svc, &mut mqtt, SessionEvent::LinkUp);
    mqtt.connected = true;
    feed(&mut svc, &mut mqtt, SessionEvent::BrokerConnected);
    feed(&mut svc, &mut mqtt, SessionEvent::SubscribeAck);

    mqtt.fail_publish = true;
    let err = cycle.tick(&mut mqtt, &mut sink).unwrap_err();
    feed(&mut svc, &mut mqtt, SessionEvent::TransportError(err));

    assert_eq!(svc.reconnect_attempts(), 1);
    assert_eq!(cycle.tick(&mut mqtt, &mut sink).unwrap(), TickOutcome::Skipped);
}
