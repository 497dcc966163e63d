//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required.

mod concurrency_tests;
mod end_to_end_tests;
mod mock_ports;
mod reconnect_tests;
mod telemetry_tests;
