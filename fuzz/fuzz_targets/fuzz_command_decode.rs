//! Fuzz target: `codec::decode`
//!
//! Drives arbitrary bytes into the command decoder and applies whatever it
//! accepts to a fresh shared state.  The decoder must never panic and a
//! rejected payload must leave the actuators untouched.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use envnode::codec;
use envnode::state::{self, DeviceSnapshot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let (_sensors, actuators) = state::split(DeviceSnapshot::default());
    let before = actuators.snapshot();

    match codec::decode(data) {
        Ok(intent) => {
            let after = actuators.apply(&intent);
            if intent.is_empty() {
                assert_eq!(after, before.actuators);
            }
            // The echo must always be valid JSON.
            let body = codec::encode_to_vec(&actuators.snapshot());
            assert!(body.starts_with(b"{") && body.ends_with(b"}"));
        }
        Err(_) => assert_eq!(actuators.snapshot(), before),
    }
});

