use bevy::prelude::*;

use crate::rig::BallRig;

/// Wrecking ball entity; its `BodyNode` follows the ball body.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ball {
    pub rig: BallRig,
}

impl Ball {
    pub fn new(rig: BallRig) -> Self {
        Self { rig }
    }
}
