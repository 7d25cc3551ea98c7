use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use super::error::RigError;
use super::parts;
use super::skeleton::{AirplaneNodes, ModelSkeleton};
use crate::physics::{
    positional_lock, BodyHandle, BodyInfo, CollisionGroup, ConstraintHandle, MatchDirections,
    PhysicsScene,
};

/// Handles of the airplane bodies and of the steering constraints the
/// actuator retargets every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirplaneRig {
    pub torso: BodyHandle,
    pub left_aileron: BodyHandle,
    pub right_aileron: BodyHandle,
    pub elevator: BodyHandle,
    pub rudder: BodyHandle,
    pub counterweight: BodyHandle,
    pub left_aileron_steering: ConstraintHandle,
    pub right_aileron_steering: ConstraintHandle,
    pub elevator_steering: ConstraintHandle,
    pub rudder_steering: ConstraintHandle,
    pub collision_group: CollisionGroup,
}

/// Counterweight position relative to the torso, ahead of the nose.
pub fn counterweight_offset() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, 5.0)
}

impl AirplaneRig {
    /// Resolves the skeleton and builds the rig. Nothing is added to the scene
    /// when a node is missing.
    pub fn build(
        scene: &mut PhysicsScene,
        skeleton: &ModelSkeleton,
        spawn: Vector3<f64>,
    ) -> Result<(Self, AirplaneNodes), RigError> {
        let nodes = AirplaneNodes::resolve(skeleton)?;
        let rig = Self::assemble(scene, &nodes, spawn);
        Ok((rig, nodes))
    }

    pub fn assemble(scene: &mut PhysicsScene, nodes: &AirplaneNodes, spawn: Vector3<f64>) -> Self {
        let group = scene.new_collision_group();

        let torso_definition = scene.create_body_definition(parts::torso(group));
        let aileron_definition = scene.create_body_definition(parts::aileron(group));
        let elevator_definition = scene.create_body_definition(parts::elevator(group));
        let rudder_definition = scene.create_body_definition(parts::rudder(group));
        let counterweight_definition = scene.create_body_definition(parts::counterweight(group));

        let torso = scene.create_body(BodyInfo {
            name: nodes.body.name.clone(),
            definition: torso_definition,
            position: spawn,
            rotation: UnitQuaternion::identity(),
        });

        let mut attach = |name: &str, definition, offset: Vector3<f64>| {
            scene.create_body(BodyInfo {
                name: name.to_string(),
                definition,
                position: spawn + offset,
                rotation: UnitQuaternion::identity(),
            })
        };
        let left_aileron_offset = nodes.offset(&nodes.left_aileron);
        let right_aileron_offset = nodes.offset(&nodes.right_aileron);
        let elevator_offset = nodes.offset(&nodes.elevators);
        let rudder_offset = nodes.offset(&nodes.rudder);

        let counterweight = attach(
            "Counterweight",
            counterweight_definition,
            counterweight_offset(),
        );
        let left_aileron = attach(
            &nodes.left_aileron.name,
            aileron_definition,
            left_aileron_offset,
        );
        let right_aileron = attach(
            &nodes.right_aileron.name,
            aileron_definition,
            right_aileron_offset,
        );
        let elevator = attach(&nodes.elevators.name, elevator_definition, elevator_offset);
        let rudder = attach(&nodes.rudder.name, rudder_definition, rudder_offset);

        for lock in positional_lock(counterweight_offset()) {
            scene.create_double_body_constraint(torso, counterweight, lock);
        }
        let left_aileron_steering =
            attach_surface(scene, torso, left_aileron, left_aileron_offset, Vector3::x());
        let right_aileron_steering =
            attach_surface(scene, torso, right_aileron, right_aileron_offset, Vector3::x());
        let elevator_steering =
            attach_surface(scene, torso, elevator, elevator_offset, Vector3::x());
        let rudder_steering = attach_surface(scene, torso, rudder, rudder_offset, Vector3::y());

        info!(
            "Built airplane rig at ({:.1}, {:.1}, {:.1})",
            spawn.x, spawn.y, spawn.z
        );

        Self {
            torso,
            left_aileron,
            right_aileron,
            elevator,
            rudder,
            counterweight,
            left_aileron_steering,
            right_aileron_steering,
            elevator_steering,
            rudder_steering,
            collision_group: group,
        }
    }

    pub fn bodies(&self) -> [BodyHandle; 6] {
        [
            self.torso,
            self.left_aileron,
            self.right_aileron,
            self.elevator,
            self.rudder,
            self.counterweight,
        ]
    }
}

/// Positional lock, fixed hinge-axis match and the retargetable steering
/// match. Returns the steering constraint.
fn attach_surface(
    scene: &mut PhysicsScene,
    torso: BodyHandle,
    surface: BodyHandle,
    offset: Vector3<f64>,
    hinge_axis: Vector3<f64>,
) -> ConstraintHandle {
    for lock in positional_lock(offset) {
        scene.create_double_body_constraint(torso, surface, lock);
    }
    scene.create_double_body_constraint(
        torso,
        surface,
        MatchDirections::new()
            .with_primary_direction(hinge_axis)
            .with_secondary_direction(hinge_axis),
    );
    scene.create_double_body_constraint(
        torso,
        surface,
        MatchDirections::new()
            .with_primary_direction(Vector3::z())
            .with_secondary_direction(Vector3::z()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ConstraintKind;
    use approx::assert_relative_eq;

    fn rig() -> (PhysicsScene, AirplaneRig) {
        let mut scene = PhysicsScene::default();
        let spawn = Vector3::new(0.0, 100.0, 0.0);
        let (rig, _) = AirplaneRig::build(&mut scene, &ModelSkeleton::airplane(), spawn).unwrap();
        (scene, rig)
    }

    fn count(scene: &PhysicsScene, body: BodyHandle, offsets: bool) -> usize {
        scene
            .constraints_of(body)
            .filter(|constraint| {
                matches!(constraint.kind, ConstraintKind::MatchDirectionOffset(_)) == offsets
            })
            .count()
    }

    #[test]
    fn test_rig_creates_six_bodies() {
        let (scene, rig) = rig();
        assert_eq!(scene.body_count(), 6);
        for body in rig.bodies() {
            assert!(scene.body(body).is_some());
        }
    }

    #[test]
    fn test_surfaces_carry_lock_and_rotation_matches() {
        let (scene, rig) = rig();
        for surface in [rig.left_aileron, rig.right_aileron, rig.elevator, rig.rudder] {
            assert_eq!(count(&scene, surface, true), 3);
            assert_eq!(count(&scene, surface, false), 2);
        }
        assert_eq!(count(&scene, rig.counterweight, true), 3);
        assert_eq!(count(&scene, rig.counterweight, false), 0);
    }

    #[test]
    fn test_bodies_spawn_at_authored_offsets() {
        let (scene, rig) = rig();
        let torso = scene.body(rig.torso).unwrap().position();
        let left = scene.body(rig.left_aileron).unwrap().position();
        let counterweight = scene.body(rig.counterweight).unwrap().position();
        assert_relative_eq!(torso, Vector3::new(0.0, 100.0, 0.0));
        assert_relative_eq!(left - torso, Vector3::new(6.0, 0.0, -2.9), epsilon = 1e-12);
        assert_relative_eq!(counterweight - torso, Vector3::new(0.0, 0.0, 5.0), epsilon = 1e-12);
        assert_eq!(scene.body(rig.rudder).unwrap().rotation(), UnitQuaternion::identity());
    }

    #[test]
    fn test_steering_constraints_start_at_rest_pose() {
        let (scene, rig) = rig();
        for steering in [
            rig.left_aileron_steering,
            rig.right_aileron_steering,
            rig.elevator_steering,
            rig.rudder_steering,
        ] {
            let constraint = scene.match_directions(steering).unwrap();
            assert_eq!(constraint.primary_direction(), Vector3::z());
        }
    }

    #[test]
    fn test_missing_node_leaves_scene_empty() {
        let mut scene = PhysicsScene::default();
        let mut skeleton = ModelSkeleton::airplane();
        skeleton.nodes.retain(|node| node.name != "Elevators");
        let result = AirplaneRig::build(&mut scene, &skeleton, Vector3::zeros());
        assert!(matches!(result, Err(RigError::MissingNode { .. })));
        assert_eq!(scene.body_count(), 0);
        assert_eq!(scene.constraint_count(), 0);
    }

    #[test]
    fn test_rig_holds_together_in_free_fall() {
        let (mut scene, rig) = rig();
        scene.set_gravity(Vector3::new(0.0, -9.8, 0.0));
        for _ in 0..240 {
            scene.step(1.0 / 120.0);
        }
        let torso = scene.body(rig.torso).unwrap();
        let elevator = scene.body(rig.elevator).unwrap().position();
        let local = torso.rotation().inverse() * (elevator - torso.position());
        assert!((local - Vector3::new(0.0, 0.75, -9.6)).norm() < 0.5, "elevator at {local:?}");
    }
}
