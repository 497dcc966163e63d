//! Shared device state.
//!
//! The latest sensor readings and the actuator intent live in one
//! [`DeviceSnapshot`] behind a critical-section mutex.  Writers are split at
//! construction into two non-cloneable handles:
//!
//! ```text
//!  TelemetryCycle ──▶ SensorWriter  ──┐
//!                                     ├──▶ Mutex<Cell<DeviceSnapshot>>
//!  SyncService    ──▶ ActuatorWriter ─┘          │
//!                                         snapshot() (whole copy)
//! ```
//!
//! Each field therefore has exactly one writer, and every read copies the
//! whole snapshot under the lock, so an encoder never sees half of an update.

use core::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::commands::CommandIntent;
use crate::capability::{RELAY_COUNT, SENSOR_COUNT};

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// One acquisition of every sensor channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    /// °C
    pub temperature: f32,
    /// %RH
    pub humidity: f32,
    /// hPa
    pub pressure: f32,
    /// lx
    pub light_intensity: f32,
    /// ppm
    pub smoke_density: f32,
}

impl Default for SensorReadings {
    /// Plausible indoor values, published until the first acquisition.
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 50.0,
            pressure: 1013.25,
            light_intensity: 300.0,
            smoke_density: 0.0,
        }
    }
}

impl SensorReadings {
    /// Reading for the sensor channel at registry `index` (0-based).
    pub fn value(&self, index: u8) -> Option<f32> {
        match index {
            0 => Some(self.temperature),
            1 => Some(self.humidity),
            2 => Some(self.pressure),
            3 => Some(self.light_intensity),
            4 => Some(self.smoke_density),
            _ => None,
        }
    }

    /// Channels in registry order.
    pub fn as_array(&self) -> [f32; SENSOR_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.pressure,
            self.light_intensity,
            self.smoke_density,
        ]
    }
}

/// Relay and breaker intent as last commanded.  All off at boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    pub relays: [bool; RELAY_COUNT],
    pub breaker: bool,
}

impl ActuatorState {
    /// State of relay `index` (1-based, as in the registry).
    pub fn relay(&self, index: u8) -> Option<bool> {
        let slot = usize::from(index).checked_sub(1)?;
        self.relays.get(slot).copied()
    }
}

/// Everything the codec needs, captured at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub sensors: SensorReadings,
    pub actuators: ActuatorState,
}

// ---------------------------------------------------------------------------
// Shared cell
// ---------------------------------------------------------------------------

type SharedCell = Mutex<CriticalSectionRawMutex, Cell<DeviceSnapshot>>;

fn read(cell: &SharedCell) -> DeviceSnapshot {
    cell.lock(Cell::get)
}

/// Create the shared state and hand out its two writers.
///
/// Neither handle implements `Clone`; moving them into their owning
/// context is what keeps each field single-writer.
pub fn split(initial: DeviceSnapshot) -> (SensorWriter, ActuatorWriter) {
    let cell = Arc::new(Mutex::new(Cell::new(initial)));
    (
        SensorWriter {
            cell: Arc::clone(&cell),
        },
        ActuatorWriter { cell },
    )
}

/// Sole writer of [`DeviceSnapshot::sensors`].
pub struct SensorWriter {
    cell: Arc<SharedCell>,
}

impl SensorWriter {
    /// Replace the sensor readings.  Actuator fields are left untouched.
    pub fn update(&self, readings: SensorReadings) {
        self.cell.lock(|c| {
            let mut snap = c.get();
            snap.sensors = readings;
            c.set(snap);
        });
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        read(&self.cell)
    }
}

/// Sole writer of [`DeviceSnapshot::actuators`].
pub struct ActuatorWriter {
    cell: Arc<SharedCell>,
}

impl ActuatorWriter {
    /// Apply a partial command.  Channels the intent does not mention keep
    /// their value.  Returns the resulting actuator state.
    pub fn apply(&self, intent: &CommandIntent) -> ActuatorState {
        self.cell.lock(|c| {
            let mut snap = c.get();
            intent.apply(&mut snap.actuators);
            c.set(snap);
            snap.actuators
        })
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        read(&self.cell)
    }
}

// ---------------------------------------------------------------------------
// Publish gate
// ---------------------------------------------------------------------------

/// Read-only view of "is the session Subscribed".
///
/// Only the service opens and closes it; the telemetry context just reads.
#[derive(Debug, Clone, Default)]
pub struct PublishGate(Arc<AtomicBool>);

impl PublishGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, open: bool) {
        self.0.store(open, Ordering::Release);
    }
}
