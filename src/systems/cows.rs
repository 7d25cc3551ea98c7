use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{pose_to_transform, Airplane, Ball, BurstVisual, Cow, OFF_STAGE};
use crate::physics::{BodyCollision, BodyHandle, PhysicsScene};
use crate::resources::{
    AudioCue, AudioSchedule, BurstTrigger, PhysicsConfig, PlaySession, SessionConfig,
};

/// Pops cows hit by the ball (or the torso, when configured) and plays the
/// rubbing sound when the torso scrapes one.
#[allow(clippy::too_many_arguments)]
pub fn cow_collision_system(
    mut collisions: EventReader<BodyCollision>,
    mut scene: ResMut<PhysicsScene>,
    config: Res<SessionConfig>,
    session: Res<PlaySession>,
    mut audio: ResMut<AudioSchedule>,
    mut cues: EventWriter<AudioCue>,
    airplanes: Query<&Airplane>,
    balls: Query<&Ball>,
    mut cows: Query<(Entity, &mut Cow, &mut Transform), Without<BurstVisual>>,
    mut visuals: Query<(&mut BurstVisual, &mut Transform), Without<Cow>>,
) {
    if collisions.is_empty() {
        return;
    }

    let torsos: Vec<BodyHandle> = airplanes.iter().map(|airplane| airplane.rig.torso).collect();
    let wrecking_balls: Vec<BodyHandle> = balls.iter().map(|ball| ball.rig.ball).collect();
    let herd: HashMap<BodyHandle, Entity> = cows
        .iter()
        .filter(|(_, cow, _)| cow.is_active())
        .map(|(entity, cow, _)| (cow.body(), entity))
        .collect();

    for collision in collisions.read() {
        for (cow_body, partner) in [
            (collision.first, collision.second),
            (collision.second, collision.first),
        ] {
            let Some(&entity) = herd.get(&cow_body) else {
                continue;
            };
            let Ok((_, mut cow, mut node)) = cows.get_mut(entity) else {
                continue;
            };
            if !cow.is_active() {
                continue;
            }

            let by_ball = wrecking_balls.contains(&partner);
            let by_torso = torsos.contains(&partner);
            let pops = by_ball || (by_torso && config.burst_trigger == BurstTrigger::BallOrTorso);

            if !pops {
                if by_torso && audio.try_rub(session.game_time()) {
                    cues.send(AudioCue::Rubbing);
                }
                continue;
            }

            let pose = scene
                .body(cow_body)
                .map(|body| pose_to_transform(body.position(), body.rotation()));
            cow.burst(config.burst_duration_secs);
            scene.delete_body(cow_body);
            node.translation = OFF_STAGE;

            if let Ok((mut visual, mut transform)) = visuals.get_mut(cow.burst_visual()) {
                visual.playing = true;
                if let Some(pose) = pose {
                    *transform = pose;
                }
            }
            cues.send(AudioCue::Pop);
            debug!("Cow {:?} popped by {}", entity, if by_ball { "ball" } else { "torso" });
        }
    }
}

/// Hides burst visuals whose animation has run its course.
pub fn cow_countdown_system(
    config: Res<PhysicsConfig>,
    mut cows: Query<&mut Cow>,
    mut visuals: Query<(&mut BurstVisual, &mut Transform)>,
) {
    for mut cow in &mut cows {
        if cow.tick(config.timestep) {
            if let Ok((mut visual, mut transform)) = visuals.get_mut(cow.burst_visual()) {
                visual.playing = false;
                transform.translation = OFF_STAGE;
            }
        }
    }
}
