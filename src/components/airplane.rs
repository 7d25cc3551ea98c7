use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use crate::physics::PhysicsScene;
use crate::resources::FlightConfig;
use crate::rig::AirplaneRig;

/// Control limits in radians, derived once from [`FlightConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightLimits {
    pub max_aileron: f64,
    pub max_elevator: f64,
    pub max_rudder: f64,
    pub max_thrust: f64,
    pub thrust_ramp: f64,
}

impl From<&FlightConfig> for FlightLimits {
    fn from(config: &FlightConfig) -> Self {
        Self {
            max_aileron: config.max_aileron(),
            max_elevator: config.max_elevator(),
            max_rudder: config.max_rudder(),
            max_thrust: config.max_thrust,
            thrust_ramp: config.thrust_ramp(),
        }
    }
}

/// Flight state of the airplane rig. Controllers write the targets, the
/// actuator turns them into velocity and constraint targets.
#[derive(Component, Debug, Clone)]
pub struct Airplane {
    pub rig: AirplaneRig,
    limits: FlightLimits,
    thrust: f64,
    target_thrust: f64,
    aileron_angle: f64,
    elevator_angle: f64,
    rudder_angle: f64,
}

impl Airplane {
    pub fn new(rig: AirplaneRig, limits: FlightLimits) -> Self {
        Self {
            rig,
            limits,
            thrust: 0.0,
            target_thrust: 0.0,
            aileron_angle: 0.0,
            elevator_angle: 0.0,
            rudder_angle: 0.0,
        }
    }

    pub fn limits(&self) -> &FlightLimits {
        &self.limits
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    /// Current thrust; it only ever spools, so this is for session setup.
    pub fn set_thrust(&mut self, thrust: f64) {
        self.thrust = thrust.max(0.0);
    }

    pub fn target_thrust(&self) -> f64 {
        self.target_thrust
    }

    pub fn set_target_thrust(&mut self, target: f64) {
        self.target_thrust = target.clamp(0.0, self.limits.max_thrust);
    }

    pub fn aileron_angle(&self) -> f64 {
        self.aileron_angle
    }

    pub fn set_aileron_angle(&mut self, angle: f64) {
        self.aileron_angle = angle.clamp(-self.limits.max_aileron, self.limits.max_aileron);
    }

    pub fn elevator_angle(&self) -> f64 {
        self.elevator_angle
    }

    pub fn set_elevator_angle(&mut self, angle: f64) {
        self.elevator_angle = angle.clamp(-self.limits.max_elevator, self.limits.max_elevator);
    }

    pub fn rudder_angle(&self) -> f64 {
        self.rudder_angle
    }

    pub fn set_rudder_angle(&mut self, angle: f64) {
        self.rudder_angle = angle.clamp(-self.limits.max_rudder, self.limits.max_rudder);
    }

    /// Moves thrust towards its target at the ramp rate without overshooting.
    pub fn ramp_thrust(&mut self, dt: f64) {
        let step = self.limits.thrust_ramp * dt.max(0.0);
        let gap = self.target_thrust - self.thrust;
        if gap.abs() <= step {
            self.thrust = self.target_thrust;
        } else {
            self.thrust += step.copysign(gap);
        }
    }

    /// Rest-pose forward direction of each steering constraint, in torso
    /// frame: left aileron, right aileron, elevator, rudder.
    pub fn steering_targets(&self) -> [Vector3<f64>; 4] {
        let forward = Vector3::z();
        [
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -self.aileron_angle) * forward,
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.aileron_angle) * forward,
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.elevator_angle) * forward,
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.rudder_angle) * forward,
        ]
    }

    /// Per-tick actuator: ramps thrust, nudges the torso along its nose,
    /// retargets the control surfaces. Returns the propeller spin increment.
    pub fn update_physics(&mut self, scene: &mut PhysicsScene, dt: f64) -> UnitQuaternion<f64> {
        let dt = dt.max(0.0);
        self.ramp_thrust(dt);

        if let Some(torso) = scene.body(self.rig.torso) {
            let velocity = torso.velocity() + torso.orientation_z() * (self.thrust * dt);
            scene.set_velocity(self.rig.torso, velocity);
        }

        let steering = [
            self.rig.left_aileron_steering,
            self.rig.right_aileron_steering,
            self.rig.elevator_steering,
            self.rig.rudder_steering,
        ];
        for (handle, target) in steering.into_iter().zip(self.steering_targets()) {
            if let Some(constraint) = scene.match_directions_mut(handle) {
                constraint.set_primary_direction(target);
            }
        }

        let spin = (360.0 * (1.0 + self.thrust) * dt).to_radians();
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), spin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::ModelSkeleton;
    use approx::assert_relative_eq;

    fn airplane() -> (PhysicsScene, Airplane) {
        let mut scene = PhysicsScene::default();
        let spawn = Vector3::new(0.0, 100.0, 0.0);
        let (rig, _) = AirplaneRig::build(&mut scene, &ModelSkeleton::airplane(), spawn).unwrap();
        (scene, Airplane::new(rig, FlightLimits::from(&FlightConfig::default())))
    }

    #[test]
    fn test_thrust_ramp_converges_without_overshoot() {
        let (_, mut airplane) = airplane();
        let dt = 1.0 / 120.0;
        airplane.set_target_thrust(10.0);
        let ramp = airplane.limits().thrust_ramp;
        let ticks = (10.0 / ramp / dt).ceil() as usize;

        for _ in 0..ticks {
            airplane.ramp_thrust(dt);
            assert!(airplane.thrust() <= 10.0);
        }
        assert_relative_eq!(airplane.thrust(), 10.0, epsilon = 1e-9);

        airplane.set_target_thrust(4.0);
        for _ in 0..(6.0 / ramp / dt).ceil() as usize {
            airplane.ramp_thrust(dt);
            assert!(airplane.thrust() >= 4.0);
        }
        assert_relative_eq!(airplane.thrust(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_target_thrust_is_clamped() {
        let (_, mut airplane) = airplane();
        airplane.set_target_thrust(1e6);
        assert_eq!(airplane.target_thrust(), airplane.limits().max_thrust);
        airplane.set_target_thrust(-3.0);
        assert_eq!(airplane.target_thrust(), 0.0);
    }

    #[test]
    fn test_surface_angles_are_clamped() {
        let (_, mut airplane) = airplane();
        airplane.set_aileron_angle(10.0);
        airplane.set_rudder_angle(-10.0);
        assert_relative_eq!(airplane.aileron_angle(), 30.0f64.to_radians());
        assert_relative_eq!(airplane.rudder_angle(), -(20.0f64.to_radians()));
    }

    #[test]
    fn test_thrust_nudges_torso_forward() {
        let (mut scene, mut airplane) = airplane();
        airplane.set_thrust(6.0);
        airplane.set_target_thrust(6.0);
        airplane.update_physics(&mut scene, 0.5);
        let velocity = scene.body(airplane.rig.torso).unwrap().velocity();
        assert_relative_eq!(velocity, Vector3::new(0.0, 0.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_steering_targets_are_idempotent() {
        let (mut scene, mut airplane) = airplane();
        airplane.set_aileron_angle(0.2);
        airplane.set_elevator_angle(-0.1);
        airplane.set_rudder_angle(0.05);

        airplane.update_physics(&mut scene, 0.0);
        let read = |scene: &PhysicsScene, airplane: &Airplane| {
            [
                airplane.rig.left_aileron_steering,
                airplane.rig.right_aileron_steering,
                airplane.rig.elevator_steering,
                airplane.rig.rudder_steering,
            ]
            .map(|handle| scene.match_directions(handle).unwrap().primary_direction())
        };
        let first = read(&scene, &airplane);
        airplane.update_physics(&mut scene, 0.0);
        let second = read(&scene, &airplane);

        assert_eq!(first, second);
        for target in first {
            assert_relative_eq!(target.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ailerons_deflect_in_opposition() {
        let (_, mut airplane) = airplane();
        airplane.set_aileron_angle(0.3);
        let [left, right, elevator, rudder] = airplane.steering_targets();
        assert_relative_eq!(left.y, -right.y, epsilon = 1e-12);
        assert!(right.y < 0.0);
        assert_eq!(elevator, Vector3::z());
        assert_eq!(rudder, Vector3::z());
    }

    #[test]
    fn test_propeller_spins_with_thrust() {
        let (mut scene, mut airplane) = airplane();
        let idle = airplane.update_physics(&mut scene, 0.01);
        assert_relative_eq!(idle.angle(), 3.6f64.to_radians(), epsilon = 1e-12);

        airplane.set_thrust(1.0);
        airplane.set_target_thrust(1.0);
        let spun = airplane.update_physics(&mut scene, 0.01);
        assert_relative_eq!(spun.angle(), 7.2f64.to_radians(), epsilon = 1e-12);
    }
}
