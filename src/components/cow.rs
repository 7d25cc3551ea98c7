use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use super::node::BodyNode;
use crate::physics::{BodyDefinitionHandle, BodyHandle, BodyInfo, FixedPosition, PhysicsScene};
use crate::rig::parts;

/// Where spent burst visuals are parked, far below the playfield.
pub const OFF_STAGE: Vec3 = Vec3::new(0.0, -1000.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CowState {
    Active,
    /// Body is gone, the burst animation is playing.
    Bursting { remaining: f64 },
    Inactive,
}

/// A destructible cow. Cows stay in the world after they pop so the roster
/// can be counted.
#[derive(Component, Debug, Clone)]
pub struct Cow {
    body: BodyHandle,
    burst_visual: Entity,
    state: CowState,
}

impl Cow {
    pub fn new(body: BodyHandle, burst_visual: Entity) -> Self {
        Self {
            body,
            burst_visual,
            state: CowState::Active,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn burst_visual(&self) -> Entity {
        self.burst_visual
    }

    pub fn state(&self) -> CowState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CowState::Active
    }

    /// Starts the burst countdown. Returns false if the cow already popped.
    pub fn burst(&mut self, duration: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = CowState::Bursting {
            remaining: duration.max(0.0),
        };
        true
    }

    /// Advances the burst countdown; returns true on the tick it runs out.
    pub fn tick(&mut self, dt: f64) -> bool {
        if let CowState::Bursting { remaining } = self.state {
            let remaining = remaining - dt.max(0.0);
            if remaining <= 0.0 {
                self.state = CowState::Inactive;
                return true;
            }
            self.state = CowState::Bursting { remaining };
        }
        false
    }
}

/// Burst animation node of one cow.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BurstVisual {
    pub playing: bool,
}

pub fn remaining_cows<'a>(cows: impl IntoIterator<Item = &'a Cow>) -> usize {
    cows.into_iter().filter(|cow| cow.is_active()).count()
}

/// Shared cow body definition. Every cow sits in the same collision group.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CowSpawner {
    definition: BodyDefinitionHandle,
    spawned: usize,
}

impl CowSpawner {
    pub fn new(scene: &mut PhysicsScene) -> Self {
        let group = scene.new_collision_group();
        Self {
            definition: scene.create_body_definition(parts::cow(group)),
            spawned: 0,
        }
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Creates an anchored cow body plus its cow and burst entities.
    pub fn spawn_cow(world: &mut World, position: Vector3<f64>) -> Option<Entity> {
        let mut spawner = *world.get_resource::<CowSpawner>()?;
        spawner.spawned += 1;
        let name = format!("Cow{}", spawner.spawned);

        let body = {
            let mut scene = world.get_resource_mut::<PhysicsScene>()?;
            let body = scene.create_body(BodyInfo {
                name,
                definition: spawner.definition,
                position,
                rotation: UnitQuaternion::identity(),
            });
            scene.create_single_body_constraint(body, FixedPosition::new(position));
            body
        };
        world.insert_resource(spawner);

        let burst_visual = world
            .spawn((BurstVisual::default(), Transform::from_translation(OFF_STAGE)))
            .id();
        let transform =
            Transform::from_xyz(position.x as f32, position.y as f32, position.z as f32);
        let cow = world
            .spawn((Cow::new(body, burst_visual), BodyNode::new(body), transform))
            .id();
        Some(cow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cow() -> Cow {
        let mut scene = PhysicsScene::default();
        let spawner = CowSpawner::new(&mut scene);
        let body = scene.create_body(BodyInfo {
            name: "Cow".to_string(),
            definition: spawner.definition,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        });
        Cow::new(body, Entity::PLACEHOLDER)
    }

    #[test]
    fn test_cow_bursts_once() {
        let mut cow = cow();
        assert!(cow.burst(2.0));
        assert!(!cow.is_active());
        assert!(!cow.burst(2.0));
        assert_eq!(cow.state(), CowState::Bursting { remaining: 2.0 });
    }

    #[test]
    fn test_countdown_ends_in_inactive() {
        let mut cow = cow();
        cow.burst(1.0);
        let mut finished = 0;
        for _ in 0..200 {
            if cow.tick(0.01) {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(cow.state(), CowState::Inactive);
        assert!(!cow.burst(1.0));
    }

    #[test]
    fn test_active_cow_ignores_ticks() {
        let mut cow = cow();
        assert!(!cow.tick(10.0));
        assert!(cow.is_active());
    }

    #[test]
    fn test_remaining_counts_active_only() {
        let mut cows: Vec<Cow> = (0..5).map(|_| cow()).collect();
        assert_eq!(remaining_cows(&cows), 5);
        cows[1].burst(1.0);
        cows[3].burst(0.0);
        cows[3].tick(0.1);
        assert_eq!(remaining_cows(&cows), 3);
    }

    #[test]
    fn test_spawn_cow_anchors_body() {
        let mut world = World::new();
        let mut scene = PhysicsScene::default();
        world.insert_resource(CowSpawner::new(&mut scene));
        world.insert_resource(scene);

        let entity = CowSpawner::spawn_cow(&mut world, Vector3::new(10.0, 20.0, 30.0)).unwrap();
        let cow = world.get::<Cow>(entity).unwrap().clone();
        let visual = world.get::<Transform>(cow.burst_visual()).unwrap();
        assert_eq!(visual.translation, OFF_STAGE);

        let scene = world.resource::<PhysicsScene>();
        assert_eq!(scene.body(cow.body()).unwrap().name(), "Cow1");
        assert_eq!(scene.constraints_of(cow.body()).count(), 1);
        assert_eq!(world.resource::<CowSpawner>().spawned(), 1);
    }
}
