use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use super::airplane::AirplaneRig;
use super::error::RigError;
use super::parts;
use super::skeleton::{BallNodes, ModelSkeleton};
use crate::physics::{
    positional_lock, BodyHandle, BodyInfo, ClampDirectionOffset, ConstraintHandle, CopyRotation,
    HingedRod, PhysicsScene,
};

/// Wrecking ball hanging under the torso.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallRig {
    pub hinge: BodyHandle,
    pub ball: BodyHandle,
    pub rod: ConstraintHandle,
    pub clamp: ConstraintHandle,
    rod_length: f64,
}

impl BallRig {
    pub fn build(
        scene: &mut PhysicsScene,
        airplane: &AirplaneRig,
        skeleton: &ModelSkeleton,
    ) -> Result<(Self, BallNodes), RigError> {
        let nodes = BallNodes::resolve(skeleton)?;
        let rig = Self::assemble(scene, airplane, &nodes);
        Ok((rig, nodes))
    }

    /// Hinge follows the torso pose; the ball swings on a rod below it with
    /// its height relative to the torso clamped.
    pub fn assemble(scene: &mut PhysicsScene, airplane: &AirplaneRig, nodes: &BallNodes) -> Self {
        let group = airplane.collision_group;
        let hinge_definition = scene.create_body_definition(parts::hinge(group));
        let ball_definition = scene.create_body_definition(parts::ball(group));

        let (torso_position, torso_rotation) = scene
            .body(airplane.torso)
            .map(|torso| (torso.position(), torso.rotation()))
            .unwrap_or_else(|| {
                warn!("Torso body is gone, building ball rig at the origin");
                (Vector3::zeros(), UnitQuaternion::identity())
            });

        let tether = nodes.tether();
        let rod_length = tether.norm();

        let hinge = scene.create_body(BodyInfo {
            name: "Hinge".to_string(),
            definition: hinge_definition,
            position: torso_position,
            rotation: torso_rotation,
        });
        let ball = scene.create_body(BodyInfo {
            name: "Ball".to_string(),
            definition: ball_definition,
            position: torso_position + tether,
            rotation: torso_rotation,
        });

        for lock in positional_lock(Vector3::zeros()) {
            scene.create_double_body_constraint(airplane.torso, hinge, lock);
        }
        scene.create_double_body_constraint(airplane.torso, hinge, CopyRotation::new());

        // Never slack into the fuselage, never further below than the rod.
        let clamp = scene.create_double_body_constraint(
            airplane.torso,
            ball,
            ClampDirectionOffset::new(Vector3::y(), -rod_length, -rod_length / 4.0),
        );
        let rod = scene.create_double_body_constraint(hinge, ball, HingedRod::new(rod_length));

        info!("Built ball rig with rod length {:.2}", rod_length);

        Self {
            hinge,
            ball,
            rod,
            clamp,
            rod_length,
        }
    }

    /// Length recorded at construction.
    pub fn rod_length(&self) -> f64 {
        self.rod_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ConstraintKind;
    use crate::rig::skeleton::SkeletonNode;
    use approx::assert_relative_eq;

    fn build(skeleton: &ModelSkeleton) -> (PhysicsScene, AirplaneRig, BallRig) {
        let mut scene = PhysicsScene::default();
        let spawn = Vector3::new(0.0, 100.0, 0.0);
        let (airplane, _) =
            AirplaneRig::build(&mut scene, &ModelSkeleton::airplane(), spawn).unwrap();
        let (ball, _) = BallRig::build(&mut scene, &airplane, skeleton).unwrap();
        (scene, airplane, ball)
    }

    #[test]
    fn test_rod_length_matches_authored_distance() {
        let skeleton = ModelSkeleton::new(
            "Ball",
            vec![
                SkeletonNode::new("UpperNode", Vector3::new(0.0, -1.0, 0.5)),
                SkeletonNode::new("LowerNode", Vector3::new(3.0, -4.0, 0.0))
                    .with_parent("UpperNode"),
                SkeletonNode::new("BallNode", Vector3::zeros()).with_parent("LowerNode"),
            ],
        );
        let (scene, _, ball) = build(&skeleton);

        assert_relative_eq!(ball.rod_length(), 5.0, epsilon = 1e-12);
        match &scene.constraint(ball.rod).unwrap().kind {
            ConstraintKind::HingedRod(rod) => {
                assert_relative_eq!(rod.length(), 5.0, epsilon = 1e-12)
            }
            other => panic!("unexpected constraint {other:?}"),
        }
    }

    #[test]
    fn test_rod_length_survives_simulation() {
        let (mut scene, airplane, ball) = build(&ModelSkeleton::ball());
        scene.set_gravity(Vector3::new(0.0, -9.8, 0.0));
        scene.set_velocity(airplane.torso, Vector3::new(0.0, 0.0, 30.0));
        for _ in 0..120 {
            scene.step(1.0 / 120.0);
        }
        assert_relative_eq!(ball.rod_length(), 8.0);
        match &scene.constraint(ball.rod).unwrap().kind {
            ConstraintKind::HingedRod(rod) => assert_relative_eq!(rod.length(), 8.0),
            other => panic!("unexpected constraint {other:?}"),
        }
    }

    #[test]
    fn test_ball_shares_airplane_group() {
        let (scene, airplane, ball) = build(&ModelSkeleton::ball());
        assert_eq!(scene.body_count(), 8);
        let torso = scene.body(airplane.torso).unwrap().position();
        let hinge = scene.body(ball.hinge).unwrap().position();
        let bob = scene.body(ball.ball).unwrap().position();
        assert_relative_eq!(hinge, torso);
        assert_relative_eq!(bob - torso, Vector3::new(0.0, -8.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_ball_node_builds_nothing() {
        let mut scene = PhysicsScene::default();
        let (airplane, _) =
            AirplaneRig::build(&mut scene, &ModelSkeleton::airplane(), Vector3::zeros()).unwrap();
        let bodies = scene.body_count();
        let constraints = scene.constraint_count();

        let mut skeleton = ModelSkeleton::ball();
        skeleton.nodes.retain(|node| node.name != "BallNode");
        let result = BallRig::build(&mut scene, &airplane, &skeleton);

        assert!(matches!(result, Err(RigError::MissingNode { .. })));
        assert_eq!(scene.body_count(), bodies);
        assert_eq!(scene.constraint_count(), constraints);
    }
}
