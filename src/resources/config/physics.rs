use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration for the physics scene
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    // Integration parameters
    pub timestep: f64,
    pub solver_iterations: usize,
    /// Fraction of the positional error corrected per step.
    pub baumgarte: f64,

    // Force parameters
    pub gravity: Vector3<f64>,
    pub air_density: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 120.0, // 120 Hz
            solver_iterations: 8,
            baumgarte: 0.2,
            gravity: Vector3::new(0.0, -9.8, 0.0), // y up
            air_density: 1.2,                      // kg/m^3
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep > 0.0 && self.timestep.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "physics timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "solver needs at least one iteration".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.baumgarte) {
            return Err(ConfigError::ValidationError(format!(
                "baumgarte factor must lie in [0, 1], got {}",
                self.baumgarte
            )));
        }
        if self.air_density < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "air density cannot be negative, got {}",
                self.air_density
            )));
        }
        Ok(())
    }
}
