use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;

use crate::components::CowSpawner;
use crate::physics::{BodyCollision, PhysicsScene};
use crate::resources::{
    AudioCue, AudioSchedule, GameConfig, GamepadSnapshot, KeyboardEvent, PlaySession, SessionRng,
};
use crate::systems::{
    actuator_system, audio_schedule_system, cow_collision_system, cow_countdown_system,
    flight_control_system, flush_deletions_system, gamepad_system, keyboard_system,
    node_sync_system, physics_step_system, session_outcome_system, session_running,
    session_undecided,
};

/// Phases of one fixed tick, run in this order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum FlightSet {
    /// Raw input into the active controller, controller into targets.
    Input,
    /// Targets into torso velocity and steering constraints.
    Actuate,
    /// Constraint solve, integration and contacts.
    Solve,
    /// Contact identities into cow transitions.
    React,
    /// Node sync, countdowns, timed audio, outcome check.
    Post,
}

/// Resources, events and the fixed-tick pipeline of a play session. Entities
/// are spawned by [`crate::session::PlayController`].
pub struct FlightPlugin {
    config: GameConfig,
}

impl FlightPlugin {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self { config }
    }
}

impl Default for FlightPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();

        // 1. Configuration and shared state
        let mut scene = PhysicsScene::from_config(&config.physics);
        let spawner = CowSpawner::new(&mut scene);
        let mut rng = SessionRng::new(config.session.seed);
        let audio = AudioSchedule::new(&config.session.audio, &mut rng);

        app.insert_resource(scene)
            .insert_resource(spawner)
            .insert_resource(rng)
            .insert_resource(audio)
            .insert_resource(PlaySession::new(config.session.defeat_after_secs))
            .insert_resource(config.physics.clone())
            .insert_resource(config.flight.clone())
            .insert_resource(config.session.clone())
            .init_resource::<GamepadSnapshot>()
            .add_event::<BodyCollision>()
            .add_event::<KeyboardEvent>()
            .add_event::<AudioCue>();

        // 2. Input -> Actuate -> Solve -> React -> Post, all paused while frozen
        app.configure_sets(
            FixedUpdate,
            (
                FlightSet::Input,
                FlightSet::Actuate,
                FlightSet::Solve,
                FlightSet::React,
                FlightSet::Post,
            )
                .chain()
                .run_if(session_running),
        )
        .configure_sets(FixedUpdate, FlightSet::Post.run_if(session_undecided))
        .add_systems(
            FixedUpdate,
            (
                (gamepad_system, keyboard_system, flight_control_system)
                    .chain()
                    .in_set(FlightSet::Input),
                actuator_system.in_set(FlightSet::Actuate),
                physics_step_system.in_set(FlightSet::Solve),
                (cow_collision_system, flush_deletions_system)
                    .chain()
                    .in_set(FlightSet::React),
                (
                    node_sync_system,
                    cow_countdown_system,
                    audio_schedule_system,
                    session_outcome_system,
                )
                    .chain()
                    .in_set(FlightSet::Post),
            ),
        );

        // 3. Deterministic single-threaded stepping
        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });

        app.init_resource::<Time<Fixed>>()
            .insert_resource(Time::<Fixed>::from_seconds(config.physics.timestep));
    }
}

/// Runs one fixed tick by hand and rotates the per-tick event buffers.
pub fn step_world(world: &mut World) {
    world.run_schedule(FixedUpdate);
    world.resource_mut::<Events<BodyCollision>>().update();
    world.resource_mut::<Events<KeyboardEvent>>().update();
}
