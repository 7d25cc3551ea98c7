mod flight;

pub use flight::{step_world, FlightPlugin, FlightSet};
