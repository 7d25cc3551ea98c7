use bevy::prelude::*;

use crate::components::{Airplane, FlightController, GamepadController, PropellerNode};
use crate::physics::PhysicsScene;
use crate::resources::{GamepadSnapshot, KeyboardEvent, PhysicsConfig};

/// Hands the airplane to the gamepad once one reports in, and keeps the
/// gamepad controller fed with the latest reading.
pub fn gamepad_system(gamepad: Res<GamepadSnapshot>, mut query: Query<&mut FlightController>) {
    for mut controller in &mut query {
        match controller.as_mut() {
            FlightController::Gamepad(active) => active.observe(*gamepad),
            FlightController::Keyboard(_) if gamepad.connected => {
                info!("Gamepad connected, switching flight controller");
                let mut active = GamepadController::default();
                active.observe(*gamepad);
                *controller = FlightController::Gamepad(active);
            }
            FlightController::Keyboard(_) => {}
        }
    }
}

pub fn keyboard_system(
    mut events: EventReader<KeyboardEvent>,
    mut query: Query<&mut FlightController>,
) {
    for event in events.read() {
        for mut controller in &mut query {
            controller.on_keyboard_event(event);
        }
    }
}

/// Controllers write thrust and surface targets for this tick.
pub fn flight_control_system(
    config: Res<PhysicsConfig>,
    scene: Res<PhysicsScene>,
    mut query: Query<(&mut FlightController, &mut Airplane)>,
) {
    let dt = config.timestep;
    for (mut controller, mut airplane) in &mut query {
        controller.update(&mut airplane, &scene, dt);
    }
}

/// Turns the airplane targets into torso velocity and steering targets.
pub fn actuator_system(
    config: Res<PhysicsConfig>,
    mut scene: ResMut<PhysicsScene>,
    mut airplanes: Query<&mut Airplane>,
    mut propellers: Query<&mut PropellerNode>,
) {
    let dt = config.timestep;
    for mut airplane in &mut airplanes {
        let torso = airplane.rig.torso;
        let spin = airplane.update_physics(&mut scene, dt);
        for mut propeller in propellers.iter_mut().filter(|propeller| propeller.torso == torso) {
            propeller.accumulate(spin);
        }
    }
}
