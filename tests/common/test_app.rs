use barnstorm::{
    components::{Airplane, Ball, Cow, CowSpawner},
    physics::{BodyHandle, PhysicsScene},
    plugins::{step_world, FlightPlugin},
    resources::{AudioCue, GameConfig, KeyboardEvent, PlaySession},
    rig::{AirplaneNodes, BallNodes, ModelSkeleton},
    session::{spawn_airplane, spawn_ball},
};
use bevy::prelude::*;
use nalgebra::Vector3;

/// Builder for a headless world with an optional airplane, ball and herd.
pub struct TestAppBuilder {
    config: GameConfig,
    airplane: Option<Vector3<f64>>,
    ball: bool,
    cows: Vec<Vector3<f64>>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        let mut config = GameConfig::default();
        config.session.seed = Some(1);
        Self {
            config,
            airplane: None,
            ball: false,
            cows: Vec::new(),
        }
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_airplane(mut self, spawn: Vector3<f64>) -> Self {
        self.airplane = Some(spawn);
        self
    }

    /// Requires an airplane.
    pub fn with_ball(mut self) -> Self {
        self.ball = true;
        self
    }

    pub fn with_cows(mut self, positions: impl IntoIterator<Item = Vector3<f64>>) -> Self {
        self.cows.extend(positions);
        self
    }

    pub fn without_gravity(mut self) -> Self {
        self.config.physics.gravity = Vector3::zeros();
        self
    }

    pub fn build(self) -> TestApp {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(FlightPlugin::with_config(self.config.clone()));

        let world = app.world_mut();
        let airplane = self.airplane.map(|spawn| {
            let nodes = AirplaneNodes::resolve(&ModelSkeleton::airplane()).unwrap();
            spawn_airplane(world, &nodes, &self.config, spawn)
        });
        let ball = match (airplane, self.ball) {
            (Some(airplane), true) => {
                let nodes = BallNodes::resolve(&ModelSkeleton::ball()).unwrap();
                spawn_ball(world, airplane, &nodes)
            }
            _ => None,
        };
        let cows = self
            .cows
            .into_iter()
            .map(|position| CowSpawner::spawn_cow(world, position).unwrap())
            .collect();

        TestApp {
            app,
            airplane,
            ball,
            cows,
        }
    }
}

/// Headless world stepped one fixed tick at a time.
pub struct TestApp {
    pub app: App,
    pub airplane: Option<Entity>,
    pub ball: Option<Entity>,
    pub cows: Vec<Entity>,
}

impl TestApp {
    pub fn run_steps(&mut self, steps: usize) {
        for _ in 0..steps {
            step_world(self.app.world_mut());
        }
    }

    pub fn run_frame(&mut self) {
        self.run_steps(1);
    }

    pub fn timestep(&self) -> f64 {
        self.app
            .world()
            .resource::<barnstorm::resources::PhysicsConfig>()
            .timestep
    }

    pub fn get_state<T: Resource>(&self) -> Option<&T> {
        self.app.world().get_resource::<T>()
    }

    pub fn get_state_mut<T: Resource>(&mut self) -> Option<Mut<T>> {
        self.app.world_mut().get_resource_mut::<T>()
    }

    pub fn scene(&self) -> &PhysicsScene {
        self.app.world().resource::<PhysicsScene>()
    }

    pub fn scene_mut(&mut self) -> Mut<PhysicsScene> {
        self.app.world_mut().resource_mut::<PhysicsScene>()
    }

    pub fn session(&self) -> &PlaySession {
        self.app.world().resource::<PlaySession>()
    }

    pub fn airplane(&self) -> &Airplane {
        let entity = self.airplane.expect("no airplane in this test app");
        self.app.world().get::<Airplane>(entity).unwrap()
    }

    pub fn airplane_mut(&mut self) -> Mut<Airplane> {
        let entity = self.airplane.expect("no airplane in this test app");
        self.app.world_mut().get_mut::<Airplane>(entity).unwrap()
    }

    pub fn ball_body(&self) -> BodyHandle {
        let entity = self.ball.expect("no ball in this test app");
        self.app.world().get::<Ball>(entity).unwrap().rig.ball
    }

    pub fn cow(&self, index: usize) -> &Cow {
        self.app.world().get::<Cow>(self.cows[index]).unwrap()
    }

    pub fn remaining_cows(&self) -> usize {
        barnstorm::components::remaining_cows(self.cows.iter().map(|entity| {
            self.app.world().get::<Cow>(*entity).unwrap()
        }))
    }

    pub fn send_key(&mut self, event: KeyboardEvent) {
        self.app.world_mut().send_event(event);
    }

    pub fn drain_audio(&mut self) -> Vec<AudioCue> {
        self.app
            .world_mut()
            .resource_mut::<Events<AudioCue>>()
            .drain()
            .collect()
    }

    pub fn query_single<T: Component>(&mut self) -> Option<&T> {
        let world = self.app.world_mut();
        let mut query = world.query::<&T>();
        query.get_single(world).ok()
    }

    pub fn query_all<T: Component>(&mut self) -> Vec<&T> {
        let world = self.app.world_mut();
        let mut query = world.query::<&T>();
        query.iter(world).collect()
    }
}
