//! Reconnect-attempt accounting through `SyncService`.

use core::time::Duration;

use crate::mock_ports::{MockLink, MockMqtt, RecordingSink};

use envnode::app::events::AppEvent;
use envnode::app::service::SyncService;
use envnode::config::SystemConfig;
use envnode::error::{Error, TransportError};
use envnode::events::SessionEvent;
use envnode::identity::DeviceIdentity;
use envnode::session::Phase;
use envnode::state::{self, DeviceSnapshot, PublishGate};

fn make_service(config: &SystemConfig) -> (SyncService, MockMqtt, MockLink, RecordingSink) {
    let identity = DeviceIdentity::resolve(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF], "ESP32");
    let (_sensors, actuators) = state::split(DeviceSnapshot::default());
    let service = SyncService::new(config, identity, actuators, PublishGate::new());
    (service, MockMqtt::new(), MockLink::new(), RecordingSink::new())
}

#[test]
fn six_link_failures_exhaust_the_ceiling() {
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&SystemConfig::default());

    for _ in 0..6 {
        svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);
    }

    assert_eq!(svc.reconnect_attempts(), 6);
    assert_eq!(svc.phase(), Phase::Disconnected);
    assert_eq!(link.reconnects.len(), 5);
    assert!(link.reconnects.iter().all(|d| *d == Duration::from_millis(1000)));
    assert_eq!(
        sink.count(|e| *e == AppEvent::SessionFault(Error::ReconnectExhausted { attempts: 6 })),
        1
    );

    // Further failures neither retry nor report again.
    svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);
    assert_eq!(svc.reconnect_attempts(), 6);
    assert_eq!(link.reconnects.len(), 5);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SessionFault(Error::ReconnectExhausted { .. }))),
        1
    );
}

#[test]
fn failing_reconnect_requests_count_until_exhausted() {
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&SystemConfig::default());
    link.fail = true;

    svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);

    assert_eq!(svc.reconnect_attempts(), 6);
    assert_eq!(link.reconnects.len(), 5);
}

#[test]
fn successful_connect_resets_the_counter() {
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&SystemConfig::default());

    for _ in 0..3 {
        svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);
    }
    assert_eq!(svc.reconnect_attempts(), 3);

    svc.handle_event(SessionEvent::LinkUp, &mut mqtt, &mut link, &mut sink);
    assert_eq!(svc.reconnect_attempts(), 3);
    mqtt.connected = true;
    svc.handle_event(SessionEvent::BrokerConnected, &mut mqtt, &mut link, &mut sink);
    assert_eq!(svc.reconnect_attempts(), 0);
}

#[test]
fn exhaustion_is_cleared_by_a_later_connect() {
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&SystemConfig::default());
    for _ in 0..6 {
        svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);
    }

    svc.handle_event(SessionEvent::LinkUp, &mut mqtt, &mut link, &mut sink);
    mqtt.connected = true;
    svc.handle_event(SessionEvent::BrokerConnected, &mut mqtt, &mut link, &mut sink);
    svc.handle_event(SessionEvent::SubscribeAck, &mut mqtt, &mut link, &mut sink);
    assert_eq!(svc.phase(), Phase::Subscribed);
    assert_eq!(svc.reconnect_attempts(), 0);

    link.reconnects.clear();
    svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);
    assert_eq!(svc.reconnect_attempts(), 1);
    assert_eq!(link.reconnects.len(), 1);
}

#[test]
fn custom_ceiling_is_honoured() {
    let config = SystemConfig {
        max_link_attempts: 2,
        reconnect_delay_ms: 250,
        ..SystemConfig::default()
    };
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&config);

    for _ in 0..4 {
        svc.handle_event(SessionEvent::LinkDown, &mut mqtt, &mut link, &mut sink);
    }

    assert_eq!(svc.reconnect_attempts(), 2);
    assert_eq!(link.reconnects, vec![Duration::from_millis(250)]);
}

#[test]
fn subscribe_failure_is_a_session_fault() {
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&SystemConfig::default());
    mqtt.fail_subscribe = true;

    svc.handle_event(SessionEvent::LinkUp, &mut mqtt, &mut link, &mut sink);
    mqtt.connected = true;
    svc.handle_event(SessionEvent::BrokerConnected, &mut mqtt, &mut link, &mut sink);

    assert_eq!(svc.phase(), Phase::Disconnected);
    assert_eq!(svc.reconnect_attempts(), 1);
    assert_eq!(
        sink.count(|e| *e
            == AppEvent::SessionFault(Error::Transport(TransportError::SubscribeFailed))),
        1
    );
}

#[test]
fn transport_error_while_disconnected_is_ignored() {
    let (mut svc, mut mqtt, mut link, mut sink) = make_service(&SystemConfig::default());
    let err = Error::Transport(TransportError::PublishFailed);

    svc.handle_event(SessionEvent::TransportError(err), &mut mqtt, &mut link, &mut sink);

    assert_eq!(svc.phase(), Phase::Disconnected);
    assert_eq!(svc.reconnect_attempts(), 0);
    assert!(link.reconnects.is_empty());
}
