pub mod components;
pub mod physics;
pub mod plugins;
pub mod resources;
pub mod rig;
pub mod session;
pub mod systems;

pub use components::{Airplane, Ball, Cow, CowState, FlightController};
pub use plugins::{step_world, FlightPlugin, FlightSet};
pub use resources::{AudioCue, GameConfig, KeyboardEvent, SessionOutcome};
pub use rig::{ModelSkeleton, PlayData, RigError};
pub use session::{PlayController, SessionError};
