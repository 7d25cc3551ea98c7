use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Control surface and engine limits of the airplane.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub max_aileron_deg: f64,
    pub max_elevator_deg: f64,
    pub max_rudder_deg: f64,
    /// Maximum thrust expressed as acceleration (m/s^2).
    pub max_thrust: f64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            max_aileron_deg: 30.0,
            max_elevator_deg: 30.0,
            max_rudder_deg: 20.0,
            max_thrust: 9.8 * 1.5, // 1.5g
        }
    }
}

impl FlightConfig {
    pub fn max_aileron(&self) -> f64 {
        self.max_aileron_deg.to_radians()
    }

    pub fn max_elevator(&self) -> f64 {
        self.max_elevator_deg.to_radians()
    }

    pub fn max_rudder(&self) -> f64 {
        self.max_rudder_deg.to_radians()
    }

    /// Rate at which thrust spools towards its target (per second).
    pub fn thrust_ramp(&self) -> f64 {
        self.max_thrust / 2.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("max_aileron_deg", self.max_aileron_deg),
            ("max_elevator_deg", self.max_elevator_deg),
            ("max_rudder_deg", self.max_rudder_deg),
            ("max_thrust", self.max_thrust),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Rates of the keyboard attitude-hold controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub roll_rate_deg: f64,
    pub max_roll_deg: f64,
    pub pitch_rate_deg: f64,
    pub max_pitch_deg: f64,
    pub rudder_rate_deg: f64,
    pub rudder_restore_deg: f64,
    /// Below this airspeed the elevator is left alone (m/s).
    pub min_airspeed: f64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            roll_rate_deg: 60.0,
            max_roll_deg: 60.0,
            pitch_rate_deg: 30.0,
            max_pitch_deg: 30.0,
            rudder_rate_deg: 40.0,
            rudder_restore_deg: 80.0,
            min_airspeed: 1.0,
        }
    }
}

impl KeyboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rudder_restore_deg <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "rudder restore speed must be positive, got {}",
                self.rudder_restore_deg
            )));
        }
        if self.min_airspeed < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "airspeed threshold cannot be negative, got {}",
                self.min_airspeed
            )));
        }
        Ok(())
    }
}
