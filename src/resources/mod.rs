mod audio;
pub mod config;
mod input;
mod rng;
mod session;

pub use audio::{AudioCue, AudioSchedule};
pub use config::{
    AudioConfig, BurstTrigger, ConfigError, FlightConfig, GameConfig, KeyboardConfig,
    PhysicsConfig, SessionConfig,
};
pub use input::{GamepadSnapshot, KeyAction, KeyboardEvent};
pub use rng::SessionRng;
pub use session::{PlaySession, SessionOutcome};
