mod cows;
mod flight;
mod nodes;
mod physics;
mod session;

pub use cows::{cow_collision_system, cow_countdown_system};
pub use flight::{actuator_system, flight_control_system, gamepad_system, keyboard_system};
pub use nodes::node_sync_system;
pub use physics::{flush_deletions_system, physics_step_system};
pub use session::{
    audio_schedule_system, session_outcome_system, session_running, session_undecided,
};
