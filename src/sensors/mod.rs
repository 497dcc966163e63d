//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every driver and produces a [`SensorReadings`] each
//! telemetry period.  Drivers are simulated: they draw bounded values from
//! the random source the hub is built with, so tests seed it for
//! repeatable output.

pub mod bh1750;
pub mod bme280;
pub mod mq2;

use log::warn;
use rand::Rng;

use crate::app::ports::SensorPort;
use crate::state::SensorReadings;
use bh1750::Bh1750;
use bme280::Bme280;
use mq2::Mq2;

/// Aggregates all sensor drivers and produces a unified reading.
pub struct SensorHub<R: Rng> {
    pub climate: Bme280,
    pub light: Bh1750,
    pub smoke: Mq2,
    rng: R,
    last: SensorReadings,
}

impl<R: Rng> SensorHub<R> {
    pub fn new(rng: R) -> Self {
        Self {
            climate: Bme280::new(),
            light: Bh1750::new(),
            smoke: Mq2::new(),
            rng,
            last: SensorReadings::default(),
        }
    }

    /// Read every channel.
    ///
    /// A non-finite value keeps the previous good reading for that channel;
    /// one bad sample must not reach the wire as `NaN`.
    pub fn read_all(&mut self) -> SensorReadings {
        let climate = self.climate.read(&mut self.rng);
        let fresh = SensorReadings {
            temperature: climate.celsius,
            humidity: climate.humidity_pct,
            pressure: climate.pressure_hpa,
            light_intensity: self.light.read_lux(&mut self.rng),
            smoke_density: self.smoke.read_ppm(&mut self.rng),
        };
        self.last = sanitize(fresh, self.last);
        self.last
    }
}

impl<R: Rng> SensorPort for SensorHub<R> {
    fn acquire(&mut self) -> SensorReadings {
        self.read_all()
    }
}

/// Replace every non-finite channel in `fresh` with the value from `last`.
pub fn sanitize(fresh: SensorReadings, last: SensorReadings) -> SensorReadings {
    let keep = |name: &str, new: f32, old: f32| {
        if new.is_finite() {
            new
        } else {
            warn!("SENSOR: {} produced {}, keeping {:.2}", name, new, old);
            old
        }
    };
    SensorReadings {
        temperature: keep("temperature", fresh.temperature, last.temperature),
        humidity: keep("humidity", fresh.humidity, last.humidity),
        pressure: keep("pressure", fresh.pressure, last.pressure),
        light_intensity: keep("light", fresh.light_intensity, last.light_intensity),
        smoke_density: keep("smoke", fresh.smoke_density, last.smoke_density),
    }
}
