pub mod airplane;
pub mod ball;
pub mod controller;
pub mod cow;
pub mod node;

pub use airplane::{Airplane, FlightLimits};
pub use ball::Ball;
pub use controller::{FlightController, GamepadController, KeyboardController};
pub use cow::{remaining_cows, BurstVisual, Cow, CowSpawner, CowState, OFF_STAGE};
pub use node::{pose_to_transform, BodyNode, PropellerNode};
