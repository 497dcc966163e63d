//! End-to-end session flow: link up → broker accept → discovery →
//! subscribe → command → state echo, all through `SyncService`.

use crate::mock_ports::{MockLink, MockMqtt, RecordingSink};

use envnode::app::events::AppEvent;
use envnode::app::service::SyncService;
use envnode::config::SystemConfig;
use envnode::events::SessionEvent;
use envnode::identity::DeviceIdentity;
use envnode::session::Phase;
use envnode::state::{self, ActuatorWriter, DeviceSnapshot, PublishGate};

const MAC: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
const STATE_TOPIC: &str = "home/device/AABBCCDDEEFF/state";
const COMMAND_TOPIC: &str = "home/device/AABBCCDDEEFF/set";

struct Rig {
    service: SyncService,
    mqtt: MockMqtt,
    link: MockLink,
    sink: RecordingSink,
    gate: PublishGate,
}

impl Rig {
    fn new() -> Self {
        let identity = DeviceIdentity::resolve(&MAC, "ESP32");
        let (_sensors, actuators) = state::split(DeviceSnapshot::default());
        Self::with_actuators(identity, actuators)
    }

    fn with_actuators(identity: DeviceIdentity, actuators: ActuatorWriter) -> Self {
        let gate = PublishGate::new();
        let mut sink = RecordingSink::new();
        let mut service =
            SyncService::new(&SystemConfig::default(), identity, actuators, gate.clone());
        service.start(&mut sink);
        Self {
            service,
            mqtt: MockMqtt::new(),
            link: MockLink::new(),
            sink,
            gate,
        }
    }

    fn feed(&mut self, event: SessionEvent) {
        if event == SessionEvent::BrokerConnected {
            self.mqtt.connected = true;
        }
        self.service
            .handle_event(event, &mut self.mqtt, &mut self.link, &mut self.sink);
    }

    fn bring_up(&mut self) {
        self.feed(SessionEvent::LinkUp);
        self.feed(SessionEvent::BrokerConnected);
        self.feed(SessionEvent::SubscribeAck);
    }

    fn command(&mut self, payload: &[u8]) {
        let msg = SessionEvent::message(COMMAND_TOPIC, payload).unwrap();
        self.feed(msg);
    }
}

#[test]
fn identity_strings_for_reference_mac() {
    let rig = Rig::new();
    let id = rig.service.identity();
    assert_eq!(id.id(), "AABBCCDDEEFF");
    assert_eq!(id.client_id(), "ESP32-AABBCCDDEEFF");
    assert_eq!(id.state_topic(), STATE_TOPIC);
    assert_eq!(id.command_topic(), COMMAND_TOPIC);
}

#[test]
fn bring_up_reaches_subscribed_with_one_discovery_run() {
    let mut rig = Rig::new();
    rig.bring_up();

    assert_eq!(rig.service.phase(), Phase::Subscribed);
    assert!(rig.gate.is_open());
    assert_eq!(rig.mqtt.retained().count(), 10);
    assert_eq!(rig.mqtt.subscriptions, vec![COMMAND_TOPIC.to_string()]);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::DiscoveryPublished { count: 10 })),
        1
    );
}

#[test]
fn discovery_documents_are_well_formed() {
    let mut rig = Rig::new();
    rig.bring_up();

    let topics: Vec<&str> = rig.mqtt.retained().map(|p| p.topic.as_str()).collect();
    assert!(topics.contains(&"homeassistant/sensor/device_AABBCCDDEEFF_sensor0/config"));
    assert!(topics.contains(&"homeassistant/switch/device_AABBCCDDEEFF_relay_2/config"));
    assert!(topics.contains(&"homeassistant/switch/device_AABBCCDDEEFF_circuit_breaker/config"));

    let relay2 = rig
        .mqtt
        .last_json("homeassistant/switch/device_AABBCCDDEEFF_relay_2/config")
        .unwrap();
    assert_eq!(relay2["command_topic"], COMMAND_TOPIC);
    assert_eq!(relay2["state_topic"], STATE_TOPIC);
    assert_eq!(relay2["value_template"], "{{ value_json.relayStatus_2 }}");
    assert_eq!(relay2["command_template"], "{ \"dalay_2\": {{ value }} }");
    assert_eq!(relay2["device"]["identifiers"][0], "device_AABBCCDDEEFF");
    assert_eq!(relay2["payload_on"], serde_json::json!(1));
    assert_eq!(relay2["payload_off"], serde_json::json!(0));
    assert_eq!(relay2["name"], "继电器 2");

    let temp = rig
        .mqtt
        .last_json("homeassistant/sensor/device_AABBCCDDEEFF_sensor0/config")
        .unwrap();
    assert!(temp.get("command_topic").is_none());
    assert_eq!(temp["name"], "温度");
}

#[test]
fn command_is_applied_and_echoed() {
    let identity = DeviceIdentity::resolve(&MAC, "ESP32");
    let (_sensors, actuators) = state::split(DeviceSnapshot::default());
    let mut rig = Rig::with_actuators(identity, actuators);
    rig.bring_up();
    rig.mqtt.clear();

    rig.command(br#"{"dalay_2":1,"circuit_breaker":0}"#);

    let echoes: Vec<_> = rig.mqtt.on_topic(STATE_TOPIC).collect();
    assert_eq!(echoes.len(), 1);
    assert!(!echoes[0].retain);

    let doc = rig.mqtt.last_json(STATE_TOPIC).unwrap();
    assert_eq!(doc["relayStatus_2"], 1);
    assert_eq!(doc["relayStatus_1"], 0);
    assert_eq!(doc["circuitBreakerStatus"], 0);
    assert_eq!(doc["temperature"], "25.00");
    assert_eq!(doc["pressure"], "1013.25");
}

#[test]
fn partial_commands_accumulate() {
    let mut rig = Rig::new();
    rig.bring_up();

    rig.command(br#"{"dalay_1":1}"#);
    rig.command(br#"{"dalay_4":1}"#);
    rig.command(br#"{"dalay_1":0}"#);

    let doc = rig.mqtt.last_json(STATE_TOPIC).unwrap();
    assert_eq!(doc["relayStatus_1"], 0);
    assert_eq!(doc["relayStatus_4"], 1);
}

#[test]
fn malformed_command_is_rejected_without_publish() {
    let mut rig = Rig::new();
    rig.bring_up();
    rig.command(br#"{"dalay_1":1}"#);
    rig.mqtt.clear();

    rig.command(b"{\"dalay_1\":");

    assert_eq!(rig.mqtt.published.len(), 0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandRejected(_))), 1);
    assert_eq!(rig.service.phase(), Phase::Subscribed);

    rig.command(b"{}");
    let doc = rig.mqtt.last_json(STATE_TOPIC).unwrap();
    assert_eq!(doc["relayStatus_1"], 1);
}

#[test]
fn messages_on_other_topics_are_ignored() {
    let mut rig = Rig::new();
    rig.bring_up();
    rig.mqtt.clear();

    let other = SessionEvent::message("home/device/000000000000/set", br#"{"dalay_1":1}"#);
    rig.feed(other.unwrap());

    assert!(rig.mqtt.published.is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandApplied { .. })), 0);
}

#[test]
fn commands_before_subscribe_ack_are_ignored() {
    let mut rig = Rig::new();
    rig.feed(SessionEvent::LinkUp);
    rig.feed(SessionEvent::BrokerConnected);
    assert_eq!(rig.service.phase(), Phase::SubscribePending);
    assert!(!rig.gate.is_open());

    rig.command(br#"{"dalay_1":1}"#);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandApplied { .. })), 0);
}

#[test]
fn broker_reaccept_republishes_discovery() {
    let mut rig = Rig::new();
    rig.bring_up();

    rig.mqtt.connected = false;
    rig.feed(SessionEvent::BrokerDisconnected);
    assert_eq!(rig.service.phase(), Phase::Connecting);
    assert!(!rig.gate.is_open());

    rig.feed(SessionEvent::BrokerConnected);
    rig.feed(SessionEvent::SubscribeAck);

    assert_eq!(rig.service.phase(), Phase::Subscribed);
    assert_eq!(rig.mqtt.retained().count(), 20);
    assert_eq!(rig.mqtt.subscriptions.len(), 2);
}

#[test]
fn echo_failure_faults_the_session() {
    let mut rig = Rig::new();
    rig.bring_up();
    rig.mqtt.fail_publish = true;

    rig.command(br#"{"dalay_3":1}"#);

    assert_ne!(rig.service.phase(), Phase::Subscribed);
    assert!(!rig.gate.is_open());
    assert_eq!(rig.service.reconnect_attempts(), 1);
    assert_eq!(rig.link.reconnects.len(), 1);
}
