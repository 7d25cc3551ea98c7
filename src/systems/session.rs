use bevy::prelude::*;

use crate::components::{remaining_cows, Cow};
use crate::resources::{AudioCue, AudioSchedule, PhysicsConfig, PlaySession, SessionOutcome};

pub fn session_running(session: Res<PlaySession>) -> bool {
    !session.is_frozen()
}

pub fn session_undecided(session: Res<PlaySession>) -> bool {
    !session.is_decided()
}

pub fn audio_schedule_system(
    config: Res<PhysicsConfig>,
    mut schedule: ResMut<AudioSchedule>,
    mut cues: EventWriter<AudioCue>,
) {
    cues.send_batch(schedule.advance(config.timestep));
}

/// Victory and defeat check; runs last in the tick.
pub fn session_outcome_system(
    config: Res<PhysicsConfig>,
    mut session: ResMut<PlaySession>,
    cows: Query<&Cow>,
) {
    let remaining = remaining_cows(cows.iter());
    match session.advance(remaining, config.timestep) {
        Some(SessionOutcome::Victory { elapsed }) => {
            info!("Victory: every cow popped after {:.2}s", elapsed);
        }
        Some(SessionOutcome::Defeat { remaining }) => {
            info!("Defeat: time ran out with {} cows left", remaining);
        }
        None => {}
    }
}
