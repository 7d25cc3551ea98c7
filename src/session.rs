//! Play session façade: builds the world, drives the fixed tick from host
//! frame times and reports the outcome through one-shot callbacks.

use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};
use std::time::Duration;
use thiserror::Error;

use crate::components::{
    pose_to_transform, remaining_cows, Airplane, Ball, BodyNode, Cow, CowSpawner, FlightController,
    FlightLimits, KeyboardController, PropellerNode,
};
use crate::physics::{BodyHandle, PhysicsScene};
use crate::plugins::{step_world, FlightPlugin};
use crate::resources::{
    AudioCue, ConfigError, GameConfig, GamepadSnapshot, KeyboardEvent, PlaySession,
    SessionOutcome, SessionRng,
};
use crate::rig::{AirplaneNodes, AirplaneRig, BallNodes, BallRig, PlayData, RigError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to build rig: {0}")]
    Rig(#[from] RigError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("A play session is already running")]
    AlreadyRunning,
    #[error("No play session is running")]
    NotRunning,
}

/// Longest host frame fed to the fixed tick in one call; anything beyond is
/// dropped, as `Time<Virtual>` does with its max delta.
pub const MAX_FRAME: Duration = Duration::from_millis(250);

type VictoryCallback = Box<dyn FnOnce(Duration)>;
type DefeatCallback = Box<dyn FnOnce(usize)>;

struct RunningSession {
    app: App,
    airplane: Entity,
    cows: Vec<Entity>,
    timestep: Duration,
    accumulator: Duration,
    on_victory: Option<VictoryCallback>,
    on_defeat: Option<DefeatCallback>,
    audio: Vec<AudioCue>,
}

impl RunningSession {
    fn world(&self) -> &World {
        self.app.world()
    }

    /// One fixed tick plus outcome dispatch.
    fn step(&mut self) {
        let world = self.app.world_mut();
        step_world(world);
        self.audio
            .extend(world.resource_mut::<Events<AudioCue>>().drain());

        match world.resource::<PlaySession>().outcome() {
            Some(SessionOutcome::Victory { elapsed }) => {
                self.on_defeat = None;
                if let Some(callback) = self.on_victory.take() {
                    callback(Duration::from_secs_f64(elapsed));
                }
            }
            Some(SessionOutcome::Defeat { remaining }) => {
                self.on_victory = None;
                if let Some(callback) = self.on_defeat.take() {
                    callback(remaining);
                }
            }
            None => {}
        }
    }
}

/// Host-facing controller of a play session.
pub struct PlayController {
    config: GameConfig,
    data: PlayData,
    running: Option<RunningSession>,
}

impl Default for PlayController {
    fn default() -> Self {
        Self::new(GameConfig::default(), PlayData::default())
    }
}

impl PlayController {
    pub fn new(config: GameConfig, data: PlayData) -> Self {
        Self {
            config,
            data,
            running: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Builds a fresh world and starts the clock. Nothing is kept when any
    /// part of the setup fails.
    pub fn start(
        &mut self,
        on_victory: impl FnOnce(Duration) + 'static,
        on_defeat: impl FnOnce(usize) + 'static,
    ) -> Result<(), SessionError> {
        if self.running.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        let mut session = self.build().inspect_err(|err| {
            error!("Failed to start play session: {}", err);
        })?;
        session.on_victory = Some(Box::new(on_victory));
        session.on_defeat = Some(Box::new(on_defeat));
        self.running = Some(session);
        Ok(())
    }

    fn build(&self) -> Result<RunningSession, SessionError> {
        self.config.validate()?;
        let airplane_nodes = AirplaneNodes::resolve(&self.data.airplane)?;
        let ball_nodes = BallNodes::resolve(&self.data.ball)?;

        let mut app = App::new();
        app.add_plugins(FlightPlugin::with_config(self.config.clone()));
        let world = app.world_mut();

        let airplane = spawn_airplane(
            world,
            &airplane_nodes,
            &self.config,
            self.config.session.airplane_spawn,
        );
        spawn_ball(world, airplane, &ball_nodes);

        let (min, max) = self.config.session.spawn_volume();
        let mut cows = Vec::with_capacity(self.config.session.cow_count);
        for _ in 0..self.config.session.cow_count {
            let position: Vector3<f64> = world.resource_mut::<SessionRng>().point_in(min, max);
            if let Some(cow) = CowSpawner::spawn_cow(world, position) {
                cows.push(cow);
            }
        }

        info!(
            "Play session started: {} cows, {:.0}s on the clock, seed {}",
            cows.len(),
            self.config.session.defeat_after_secs,
            world.resource::<SessionRng>().seed()
        );

        Ok(RunningSession {
            app,
            airplane,
            cows,
            timestep: Duration::from_secs_f64(self.config.physics.timestep),
            accumulator: Duration::ZERO,
            on_victory: None,
            on_defeat: None,
            audio: vec![AudioCue::Soundtrack],
        })
    }

    /// Tears the session down. Pending callbacks are dropped unfired.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        let session = self.running.take().ok_or(SessionError::NotRunning)?;
        info!(
            "Play session stopped at {:.2}s",
            session.world().resource::<PlaySession>().game_time()
        );
        Ok(())
    }

    /// Pauses every phase without tearing anything down.
    pub fn freeze(&mut self) {
        if let Some(session) = self.running.as_mut() {
            session.app.world_mut().resource_mut::<PlaySession>().freeze();
            session.accumulator = Duration::ZERO;
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|session| session.world().resource::<PlaySession>().is_frozen())
    }

    /// Feeds a key transition to the active controller. Returns true when the
    /// keyboard controller is active and the key is bound.
    pub fn on_keyboard_event(&mut self, event: KeyboardEvent) -> bool {
        let Some(session) = self.running.as_mut() else {
            return false;
        };
        let airplane = session.airplane;
        session
            .app
            .world_mut()
            .get_mut::<FlightController>(airplane)
            .is_some_and(|mut controller| controller.on_keyboard_event(&event))
    }

    /// Latest gamepad reading; a connected pad takes over from the keyboard
    /// on the next tick.
    pub fn update_gamepad(&mut self, snapshot: GamepadSnapshot) {
        if let Some(session) = self.running.as_mut() {
            *session.app.world_mut().resource_mut::<GamepadSnapshot>() = snapshot;
        }
    }

    /// Runs as many fixed ticks as `elapsed` covers, up to [`MAX_FRAME`].
    /// Time passed while frozen is dropped.
    pub fn update(&mut self, elapsed: Duration) {
        let Some(session) = self.running.as_mut() else {
            return;
        };
        if session.world().resource::<PlaySession>().is_frozen() {
            return;
        }

        if elapsed > MAX_FRAME {
            debug!("Host frame of {:?} clamped to {:?}", elapsed, MAX_FRAME);
        }
        session.accumulator += elapsed.min(MAX_FRAME);
        while session.accumulator >= session.timestep {
            session.accumulator -= session.timestep;
            session.step();
        }
    }

    /// Runs exactly one fixed tick, ignoring the accumulator.
    pub fn step(&mut self) {
        if let Some(session) = self.running.as_mut() {
            session.step();
        }
    }

    pub fn cows_remaining(&self) -> usize {
        self.running.as_ref().map_or(0, |session| {
            let world = session.world();
            remaining_cows(session.cows.iter().filter_map(|entity| world.get::<Cow>(*entity)))
        })
    }

    pub fn remaining_time(&self) -> Duration {
        self.running.as_ref().map_or(Duration::ZERO, |session| {
            session.world().resource::<PlaySession>().remaining_time()
        })
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.running
            .as_ref()
            .and_then(|session| session.world().resource::<PlaySession>().outcome())
    }

    pub fn airplane(&self) -> Option<&Airplane> {
        let session = self.running.as_ref()?;
        session.world().get::<Airplane>(session.airplane)
    }

    /// Audio requests raised since the last call.
    pub fn drain_audio_cues(&mut self) -> Vec<AudioCue> {
        self.running
            .as_mut()
            .map(|session| std::mem::take(&mut session.audio))
            .unwrap_or_default()
    }

    pub fn world(&self) -> Option<&World> {
        self.running.as_ref().map(RunningSession::world)
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.running.as_mut().map(|session| session.app.world_mut())
    }
}

/// Assembles the airplane rig and spawns its entities: the airplane itself
/// (keyboard controlled), one node per control surface and the propeller.
pub fn spawn_airplane(
    world: &mut World,
    nodes: &AirplaneNodes,
    config: &GameConfig,
    spawn: Vector3<f64>,
) -> Entity {
    let rig = {
        let mut scene = world.resource_mut::<PhysicsScene>();
        AirplaneRig::assemble(&mut scene, nodes, spawn)
    };

    let torso_transform = body_transform(world, rig.torso);
    let airplane = world
        .spawn((
            Airplane::new(rig, FlightLimits::from(&config.flight)),
            FlightController::Keyboard(KeyboardController::new(config.keyboard.clone())),
            BodyNode::new(rig.torso),
            torso_transform,
            Name::new(nodes.body.name.clone()),
        ))
        .id();

    for (body, node) in [
        (rig.left_aileron, &nodes.left_aileron),
        (rig.right_aileron, &nodes.right_aileron),
        (rig.elevator, &nodes.elevators),
        (rig.rudder, &nodes.rudder),
    ] {
        let transform = body_transform(world, body);
        world.spawn((BodyNode::new(body), transform, Name::new(node.name.clone())));
    }

    let propeller_offset = nodes.offset(&nodes.propeller);
    world.spawn((
        PropellerNode::new(rig.torso, propeller_offset),
        pose_to_transform(spawn + propeller_offset, UnitQuaternion::identity()),
        Name::new(nodes.propeller.name.clone()),
    ));
    airplane
}

/// Hangs the wrecking ball under an airplane spawned by [`spawn_airplane`].
pub fn spawn_ball(world: &mut World, airplane: Entity, nodes: &BallNodes) -> Option<Entity> {
    let airplane_rig = world.get::<Airplane>(airplane)?.rig;
    let rig = {
        let mut scene = world.resource_mut::<PhysicsScene>();
        BallRig::assemble(&mut scene, &airplane_rig, nodes)
    };
    let transform = body_transform(world, rig.ball);
    let ball = world
        .spawn((
            Ball::new(rig),
            BodyNode::new(rig.ball),
            transform,
            Name::new(nodes.ball.name.clone()),
        ))
        .id();
    Some(ball)
}

fn body_transform(world: &World, body: BodyHandle) -> Transform {
    world
        .resource::<PhysicsScene>()
        .body(body)
        .map(|body| pose_to_transform(body.position(), body.rotation()))
        .unwrap_or_default()
}
