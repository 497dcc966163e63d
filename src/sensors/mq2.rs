use rand::Rng;

use super::bme280::sample;

/// MQ-2 smoke concentration window (ppm).
pub const SMOKE_RANGE_PPM: (f32, f32) = (0.0, 100.0);

/// MQ-2 combustible gas / smoke channel (simulated).
#[derive(Debug, Default)]
pub struct Mq2;

impl Mq2 {
    pub fn new() -> Self {
        Self
    }

    pub fn read_ppm(&self, rng: &mut impl Rng) -> f32 {
        sample(rng, SMOKE_RANGE_PPM)
    }
}
