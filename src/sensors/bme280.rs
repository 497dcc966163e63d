//! BME280 combined temperature / humidity / pressure channel (simulated).
//!
//! Values are drawn uniformly from the sensor's plausible indoor window.

use rand::Rng;

pub const TEMPERATURE_RANGE_C: (f32, f32) = (10.0, 35.0);
pub const HUMIDITY_RANGE_PCT: (f32, f32) = (30.0, 90.0);
pub const PRESSURE_RANGE_HPA: (f32, f32) = (950.0, 1050.0);

#[derive(Debug, Clone, Copy)]
pub struct Bme280Reading {
    pub celsius: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

#[derive(Debug, Default)]
pub struct Bme280;

impl Bme280 {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, rng: &mut impl Rng) -> Bme280Reading {
        Bme280Reading {
            celsius: sample(rng, TEMPERATURE_RANGE_C),
            humidity_pct: sample(rng, HUMIDITY_RANGE_PCT),
            pressure_hpa: sample(rng, PRESSURE_RANGE_HPA),
        }
    }
}

pub(super) fn sample(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    rng.gen_range(lo..=hi)
}
