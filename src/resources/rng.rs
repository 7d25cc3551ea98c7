use bevy::prelude::*;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded random source shared by everything a session randomizes.
#[derive(Resource, Debug, Clone)]
pub struct SessionRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SessionRng {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            warn!("No seed provided, using entropy");
            rand::random()
        });
        info!("Creating session RNG with seed: {}", seed);
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform point inside the box spanned by `min` and `max`.
    pub fn point_in(&mut self, min: Vector3<f64>, max: Vector3<f64>) -> Vector3<f64> {
        let unit = Vector3::new(self.rng.gen::<f64>(), self.rng.gen(), self.rng.gen());
        min + (max - min).component_mul(&unit)
    }

    /// One-based variant number in `1..=count`.
    pub fn variant(&mut self, count: u8) -> u8 {
        1 + self.rng.gen_range(0..count.max(1))
    }
}
