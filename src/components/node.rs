use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use crate::physics::BodyHandle;

/// Scene node whose `Transform` mirrors a physics body every tick.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BodyNode {
    pub body: BodyHandle,
}

impl BodyNode {
    pub fn new(body: BodyHandle) -> Self {
        Self { body }
    }
}

/// Cosmetic propeller riding on the torso. Not a body.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PropellerNode {
    pub torso: BodyHandle,
    /// Mount point in torso frame.
    pub offset: Vector3<f64>,
    /// Accumulated spin about the local Z axis.
    pub spin: UnitQuaternion<f64>,
}

impl PropellerNode {
    pub fn new(torso: BodyHandle, offset: Vector3<f64>) -> Self {
        Self {
            torso,
            offset,
            spin: UnitQuaternion::identity(),
        }
    }

    pub fn accumulate(&mut self, increment: UnitQuaternion<f64>) {
        self.spin *= increment;
        self.spin.renormalize_fast();
    }
}

/// Converts a simulation pose into a render transform.
pub fn pose_to_transform(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Transform {
    let q = rotation.quaternion();
    Transform {
        translation: Vec3::new(position.x as f32, position.y as f32, position.z as f32),
        rotation: Quat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32).normalize(),
        scale: Vec3::ONE,
    }
}
