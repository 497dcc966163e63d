//! BH1750 ambient light channel (simulated), 0–1000 lx.

use rand::Rng;

use super::bme280::sample;

pub const LIGHT_RANGE_LX: (f32, f32) = (0.0, 1000.0);

#[derive(Debug, Default)]
pub struct Bh1750;

impl Bh1750 {
    pub fn new() -> Self {
        Self
    }

    pub fn read_lux(&self, rng: &mut impl Rng) -> f32 {
        sample(rng, LIGHT_RANGE_LX)
    }
}
