use bevy::prelude::*;

use crate::physics::{BodyCollision, PhysicsScene};
use crate::resources::PhysicsConfig;

/// Advances the scene one fixed step and publishes its contacts.
pub fn physics_step_system(
    config: Res<PhysicsConfig>,
    mut scene: ResMut<PhysicsScene>,
    mut collisions: EventWriter<BodyCollision>,
) {
    collisions.send_batch(scene.step(config.timestep));
}

/// Applies the body deletions requested while reacting to contacts.
pub fn flush_deletions_system(mut scene: ResMut<PhysicsScene>) {
    let removed = scene.flush_deletions();
    if removed > 0 {
        debug!("Removed {} bodies from the scene", removed);
    }
}
