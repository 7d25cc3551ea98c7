use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Which airplane bodies pop a cow on contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BurstTrigger {
    /// Only the wrecking ball. Torso contacts just rub.
    #[default]
    Ball,
    BallOrTorso,
}

/// Delays and variant counts of the radio chatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub intro_after_secs: f64,
    pub tower_after_secs: f64,
    pub pilot_after_secs: f64,
    pub rubbing_cooldown_secs: f64,
    pub intro_variants: u8,
    pub tower_variants: u8,
    pub pilot_variants: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            intro_after_secs: 1.0,
            tower_after_secs: 45.0,
            pilot_after_secs: 90.0,
            rubbing_cooldown_secs: 1.0,
            intro_variants: 5,
            tower_variants: 4,
            pilot_variants: 5,
        }
    }
}

/// Rules of one play session.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub defeat_after_secs: f64,
    pub cow_count: usize,
    /// Opposite corners of the volume cows spawn in.
    pub spawn_min: Vector3<f64>,
    pub spawn_max: Vector3<f64>,
    pub airplane_spawn: Vector3<f64>,
    pub burst_duration_secs: f64,
    pub burst_trigger: BurstTrigger,
    /// Seed for cow placement and voice lines, entropy when absent.
    pub seed: Option<u64>,
    pub audio: AudioConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            defeat_after_secs: 120.0,
            cow_count: 100,
            spawn_min: Vector3::new(-400.0, 0.0, -400.0),
            spawn_max: Vector3::new(400.0, 200.0, 400.0),
            airplane_spawn: Vector3::new(0.0, 100.0, 0.0),
            burst_duration_secs: 2.0,
            burst_trigger: BurstTrigger::Ball,
            seed: None,
            audio: AudioConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Spawn volume with every axis ordered min to max.
    pub fn spawn_volume(&self) -> (Vector3<f64>, Vector3<f64>) {
        let mut min = self.spawn_min;
        let mut max = self.spawn_max;
        for axis in 0..3 {
            if min[axis] > max[axis] {
                warn!(
                    "Invalid spawn range on axis {}: min ({}) > max ({}). Swapping values.",
                    axis, min[axis], max[axis]
                );
                std::mem::swap(&mut min[axis], &mut max[axis]);
            }
        }
        (min, max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defeat_after_secs.is_nan() || self.defeat_after_secs <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "defeat threshold must be positive, got {}",
                self.defeat_after_secs
            )));
        }
        if self.burst_duration_secs < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "burst duration cannot be negative, got {}",
                self.burst_duration_secs
            )));
        }
        let audio = &self.audio;
        if audio.intro_variants == 0 || audio.tower_variants == 0 || audio.pilot_variants == 0 {
            return Err(ConfigError::ValidationError(
                "every voice line needs at least one variant".to_string(),
            ));
        }
        Ok(())
    }
}
