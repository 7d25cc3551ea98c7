use bevy::prelude::*;

use crate::components::{pose_to_transform, BodyNode, PropellerNode};
use crate::physics::PhysicsScene;

/// Mirrors body poses into their scene nodes.
pub fn node_sync_system(
    scene: Res<PhysicsScene>,
    mut nodes: Query<(&BodyNode, &mut Transform), Without<PropellerNode>>,
    mut propellers: Query<(&PropellerNode, &mut Transform), Without<BodyNode>>,
) {
    for (node, mut transform) in &mut nodes {
        // Popped cows keep their node but lose the body.
        if let Some(body) = scene.body(node.body) {
            *transform = pose_to_transform(body.position(), body.rotation());
        }
    }

    for (propeller, mut transform) in &mut propellers {
        if let Some(torso) = scene.body(propeller.torso) {
            let rotation = torso.rotation();
            *transform = pose_to_transform(
                torso.position() + rotation * propeller.offset,
                rotation * propeller.spin,
            );
        }
    }
}
