//! Application core: pure domain logic, zero I/O.
//!
//! Session orchestration, command application and discovery publishing
//! live behind the **port traits** defined in [`ports`], keeping this
//! layer testable without a radio or a broker.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
