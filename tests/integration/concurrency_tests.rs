//! Shared-state consistency with both writers running on real threads.

use std::thread;

use envnode::app::commands::CommandIntent;
use envnode::codec;
use envnode::state::{self, DeviceSnapshot, SensorReadings};

const ROUNDS: u32 = 2_000;

fn uniform(v: f32) -> SensorReadings {
    SensorReadings {
        temperature: v,
        humidity: v,
        pressure: v,
        light_intensity: v,
        smoke_density: v,
    }
}

fn all_relays(on: bool) -> CommandIntent {
    CommandIntent {
        relays: [Some(on); 4],
        breaker: Some(on),
    }
}

fn assert_consistent(snap: &DeviceSnapshot) {
    let s = snap.sensors.as_array();
    assert!(s.iter().all(|v| *v == s[0]), "torn sensors: {s:?}");
    let a = snap.actuators;
    assert!(
        a.relays.iter().all(|r| *r == a.breaker),
        "torn actuators: {a:?}"
    );
}

#[test]
fn no_torn_snapshot_under_concurrent_writers() {
    let (sensors, actuators) = state::split(DeviceSnapshot {
        sensors: uniform(0.0),
        ..DeviceSnapshot::default()
    });

    let telemetry = thread::spawn(move || {
        for i in 0..ROUNDS {
            sensors.update(uniform(i as f32));
            let snap = sensors.snapshot();
            assert_consistent(&snap);
            // Encoding works on the copy, never the live cell.
            let doc = codec::encode(&snap);
            assert_eq!(doc["relayStatus_1"], doc["circuitBreakerStatus"]);
        }
    });

    let commands = thread::spawn(move || {
        for i in 0..ROUNDS {
            actuators.apply(&all_relays(i % 2 == 0));
            assert_consistent(&actuators.snapshot());
        }
        actuators
    });

    telemetry.join().unwrap();
    let actuators = commands.join().unwrap();
    let last = actuators.snapshot();
    assert_eq!(last.sensors.temperature, (ROUNDS - 1) as f32);
    assert_eq!(last.actuators.relays, [false; 4]);
}

#[test]
fn writers_never_clobber_each_other() {
    let (sensors, actuators) = state::split(DeviceSnapshot::default());

    let t = thread::spawn(move || {
        for i in 0..ROUNDS {
            sensors.update(uniform(i as f32));
        }
    });
    let intent = CommandIntent {
        relays: [None, Some(true), None, None],
        breaker: None,
    };
    for _ in 0..ROUNDS {
        actuators.apply(&intent);
    }
    t.join().unwrap();

    let snap = actuators.snapshot();
    assert_eq!(snap.actuators.relays, [false, true, false, false]);
    assert_eq!(snap.sensors.smoke_density, (ROUNDS - 1) as f32);
}
