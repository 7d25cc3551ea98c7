pub mod flight;
pub mod physics;
pub mod session;

pub use flight::{FlightConfig, KeyboardConfig};
pub use physics::PhysicsConfig;
pub use session::{AudioConfig, BurstTrigger, SessionConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid game configuration: {0}")]
    ValidationError(String),
}

/// Every tunable of the game, loadable from a single YAML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub flight: FlightConfig,
    pub keyboard: KeyboardConfig,
    pub session: SessionConfig,
}

impl GameConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.flight.validate()?;
        self.keyboard.validate()?;
        self.session.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.physics.timestep, 1.0 / 120.0);
        assert_eq!(config.session.cow_count, 100);
        assert_eq!(config.session.defeat_after_secs, 120.0);
        assert_eq!(config.flight.max_rudder_deg, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() -> Result<(), ConfigError> {
        let mut config = GameConfig::default();
        config.session.seed = Some(7);
        config.session.burst_trigger = BurstTrigger::BallOrTorso;

        let temp_file = NamedTempFile::new()?;
        config.save(temp_file.path())?;
        let loaded = GameConfig::load(temp_file.path())?;

        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = GameConfig::from_yaml_str("session:\n  cow_count: 3\n  seed: 11\n").unwrap();
        assert_eq!(config.session.cow_count, 3);
        assert_eq!(config.session.seed, Some(11));
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_invalid_timestep_is_rejected() {
        let result = GameConfig::from_yaml_str("physics:\n  timestep: 0.0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        let result = GameConfig::from_yaml_str("physics: [unclosed");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_spawn_volume_orders_bounds() {
        let config = SessionConfig {
            spawn_min: Vector3::new(10.0, 0.0, -5.0),
            spawn_max: Vector3::new(-10.0, 20.0, 5.0),
            ..Default::default()
        };
        let (min, max) = config.spawn_volume();
        assert_eq!(min.x, -10.0);
        assert_eq!(max.x, 10.0);
        assert_eq!(min.y, 0.0);
    }
}
