//! EnvNode firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod capability;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod identity;
pub mod session;
pub mod state;
pub mod telemetry;

// Hardware-facing modules; the ESP-IDF halves are cfg-gated inside.
pub mod adapters;
pub mod sensors;
