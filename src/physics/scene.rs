use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use super::aerodynamics::surface_force;
use super::arena::Arena;
use super::body::{
    Body, BodyDefinition, BodyDefinitionHandle, BodyHandle, BodyInfo, CollisionGroup,
    ResolvedDefinition,
};
use super::collision::{intersect, BodyCollision, Contact, WorldShape};
use super::constraint::{
    Constraint, ConstraintBodies, ConstraintHandle, ConstraintKind, MatchDirections,
};
use super::solver::{solve, RowBuilder, SolverBody};
use crate::resources::PhysicsConfig;

/// Solver tuning shared by every step.
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings {
    pub iterations: usize,
    pub baumgarte: f64,
    pub air_density: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iterations: 8,
            baumgarte: 0.2,
            air_density: 1.2,
        }
    }
}

/// Rigid bodies, their shared definitions and the constraints between them.
///
/// Bodies and constraints are addressed through generational handles; a
/// handle to something that has been removed simply resolves to `None`.
/// Deleting a body only marks it: it leaves the simulation immediately but is
/// removed, together with every constraint touching it, by
/// [`PhysicsScene::flush_deletions`].
#[derive(Resource)]
pub struct PhysicsScene {
    definitions: Vec<ResolvedDefinition>,
    bodies: Arena<Body>,
    constraints: Arena<Constraint>,
    gravity: Vector3<f64>,
    settings: SolverSettings,
    active_contacts: HashSet<(BodyHandle, BodyHandle)>,
    last_collision_group: u32,
}

impl Default for PhysicsScene {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

impl PhysicsScene {
    pub fn new(settings: SolverSettings) -> Self {
        Self {
            definitions: Vec::new(),
            bodies: Arena::new(),
            constraints: Arena::new(),
            gravity: Vector3::zeros(),
            settings,
            active_contacts: HashSet::new(),
            last_collision_group: 0,
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        let mut scene = Self::new(SolverSettings {
            iterations: config.solver_iterations,
            baumgarte: config.baumgarte,
            air_density: config.air_density,
        });
        scene.set_gravity(config.gravity);
        scene
    }

    pub fn set_gravity(&mut self, gravity: Vector3<f64>) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    pub fn new_collision_group(&mut self) -> CollisionGroup {
        self.last_collision_group += 1;
        CollisionGroup(self.last_collision_group)
    }

    pub fn create_body_definition(&mut self, definition: BodyDefinition) -> BodyDefinitionHandle {
        self.definitions.push(ResolvedDefinition::new(definition));
        BodyDefinitionHandle(self.definitions.len() - 1)
    }

    pub fn definition(&self, handle: BodyDefinitionHandle) -> Option<&BodyDefinition> {
        self.definitions.get(handle.0).map(|resolved| &resolved.info)
    }

    pub fn create_body(&mut self, info: BodyInfo) -> BodyHandle {
        BodyHandle(self.bodies.insert(Body::new(info)))
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies
            .iter()
            .map(|(index, body)| (BodyHandle(index), body))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vector3<f64>) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.position = position;
        }
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vector3<f64>) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.velocity = velocity;
        }
    }

    pub fn set_rotation(&mut self, handle: BodyHandle, rotation: UnitQuaternion<f64>) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.rotation = rotation;
        }
    }

    /// Marks the body for removal. Safe to call while handling collision
    /// events; returns false for unknown or already deleted bodies.
    pub fn delete_body(&mut self, handle: BodyHandle) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(body) if !body.pending_delete => {
                body.pending_delete = true;
                true
            }
            _ => false,
        }
    }

    /// Removes marked bodies and every constraint attached to them.
    pub fn flush_deletions(&mut self) -> usize {
        let doomed: Vec<BodyHandle> = self
            .bodies()
            .filter(|(_, body)| body.pending_delete)
            .map(|(handle, _)| handle)
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let orphaned: Vec<_> = self
            .constraints
            .iter()
            .filter(|(_, constraint)| doomed.iter().any(|body| constraint.bodies.involves(*body)))
            .map(|(index, _)| index)
            .collect();
        for index in orphaned {
            self.constraints.remove(index);
        }
        for handle in &doomed {
            self.bodies.remove(handle.0);
        }
        self.active_contacts
            .retain(|(first, second)| !doomed.contains(first) && !doomed.contains(second));
        doomed.len()
    }

    pub fn create_double_body_constraint(
        &mut self,
        primary: BodyHandle,
        secondary: BodyHandle,
        kind: impl Into<ConstraintKind>,
    ) -> ConstraintHandle {
        let mut kind = kind.into();
        if let ConstraintKind::CopyRotation(copy) = &mut kind {
            if copy.relative.is_none() {
                let primary_rotation = self.body(primary).map(Body::rotation);
                let secondary_rotation = self.body(secondary).map(Body::rotation);
                if let (Some(a), Some(b)) = (primary_rotation, secondary_rotation) {
                    copy.relative = Some(a.inverse() * b);
                }
            }
        }
        ConstraintHandle(self.constraints.insert(Constraint {
            bodies: ConstraintBodies::Pair { primary, secondary },
            kind,
        }))
    }

    pub fn create_single_body_constraint(
        &mut self,
        body: BodyHandle,
        kind: impl Into<ConstraintKind>,
    ) -> ConstraintHandle {
        ConstraintHandle(self.constraints.insert(Constraint {
            bodies: ConstraintBodies::Single(body),
            kind: kind.into(),
        }))
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle.0)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints_of(&self, body: BodyHandle) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .map(|(_, constraint)| constraint)
            .filter(move |constraint| constraint.bodies.involves(body))
    }

    pub fn match_directions(&self, handle: ConstraintHandle) -> Option<&MatchDirections> {
        match &self.constraints.get(handle.0)?.kind {
            ConstraintKind::MatchDirections(constraint) => Some(constraint),
            _ => None,
        }
    }

    pub fn match_directions_mut(
        &mut self,
        handle: ConstraintHandle,
    ) -> Option<&mut MatchDirections> {
        match &mut self.constraints.get_mut(handle.0)?.kind {
            ConstraintKind::MatchDirections(constraint) => Some(constraint),
            _ => None,
        }
    }

    /// Advances the simulation and reports every body pair in contact.
    ///
    /// A non-positive step leaves the scene untouched.
    pub fn step(&mut self, dt: f64) -> Vec<BodyCollision> {
        if dt <= 0.0 {
            return Vec::new();
        }

        let mut handles = Vec::with_capacity(self.bodies.len());
        let mut solver_bodies = Vec::with_capacity(self.bodies.len());
        let mut slot_of = HashMap::with_capacity(self.bodies.len());

        for (index, body) in self.bodies.iter() {
            if body.pending_delete {
                continue;
            }
            let Some(definition) = self.definitions.get(body.definition.0) else {
                continue;
            };
            let rotation = body.rotation.to_rotation_matrix().into_inner();
            let inverse_inertia = rotation * definition.inverse_inertia * rotation.transpose();

            let mut force: Vector3<f64> = Vector3::zeros();
            let mut torque: Vector3<f64> = Vector3::zeros();
            for surface in &definition.info.aerodynamic_surfaces {
                let (surface_force, surface_torque) = surface_force(
                    surface,
                    body.rotation,
                    body.velocity,
                    body.angular_velocity,
                    self.settings.air_density,
                );
                force += surface_force;
                torque += surface_torque;
            }

            let mut velocity = body.velocity;
            let mut angular_velocity = body.angular_velocity;
            if definition.inverse_mass > 0.0 {
                velocity += (self.gravity + force * definition.inverse_mass) * dt;
                angular_velocity += inverse_inertia * torque * dt;
            }
            velocity /= 1.0 + definition.info.drag_factor * dt;
            angular_velocity /= 1.0 + definition.info.angular_drag_factor * dt;

            slot_of.insert(BodyHandle(index), solver_bodies.len());
            handles.push(BodyHandle(index));
            solver_bodies.push(SolverBody {
                position: body.position,
                rotation: body.rotation,
                velocity,
                angular_velocity,
                inverse_mass: definition.inverse_mass,
                inverse_inertia,
            });
        }

        let contacts = self.detect_contacts(&handles, &solver_bodies);

        let mut builder = RowBuilder::new(&solver_bodies, self.settings.baumgarte, dt);
        for (_, constraint) in self.constraints.iter() {
            let endpoints = match constraint.bodies {
                ConstraintBodies::Pair { primary, secondary } => {
                    match (slot_of.get(&primary), slot_of.get(&secondary)) {
                        (Some(a), Some(b)) => (Some(*a), *b),
                        _ => continue,
                    }
                }
                ConstraintBodies::Single(body) => match slot_of.get(&body) {
                    Some(b) => (None, *b),
                    None => continue,
                },
            };
            builder.add_constraint(constraint, endpoints);
        }
        for (first, second, restitution, contact) in &contacts {
            builder.add_contact((Some(*first), *second), contact, *restitution);
        }
        let mut rows = builder.finish();
        solve(&mut rows, &mut solver_bodies, self.settings.iterations);

        for (handle, solved) in handles.iter().zip(&solver_bodies) {
            let Some(body) = self.bodies.get_mut(handle.0) else {
                continue;
            };
            body.velocity = solved.velocity;
            body.angular_velocity = solved.angular_velocity;
            body.position += solved.velocity * dt;
            let spin = solved.angular_velocity * dt;
            if spin.norm_squared() > 0.0 {
                body.rotation = UnitQuaternion::new_normalize(
                    (UnitQuaternion::from_scaled_axis(spin) * body.rotation).into_inner(),
                );
            }
        }

        let touching: HashSet<(BodyHandle, BodyHandle)> = contacts
            .iter()
            .map(|(first, second, _, _)| (handles[*first], handles[*second]))
            .collect();
        let mut events: Vec<BodyCollision> = touching
            .iter()
            .map(|&(first, second)| BodyCollision {
                first,
                second,
                is_beginning: !self.active_contacts.contains(&(first, second)),
            })
            .collect();
        events.sort_by_key(|event| (event.first, event.second));
        self.active_contacts = touching;
        events
    }

    fn detect_contacts(
        &self,
        handles: &[BodyHandle],
        solver_bodies: &[SolverBody],
    ) -> Vec<(usize, usize, f64, Contact)> {
        let mut placed = Vec::with_capacity(handles.len());
        for (handle, solved) in handles.iter().zip(solver_bodies) {
            let definition = self
                .bodies
                .get(handle.0)
                .and_then(|body| self.definitions.get(body.definition.0));
            placed.push(definition.map(|definition| {
                let shapes: Vec<WorldShape> = definition
                    .info
                    .collision_shapes
                    .iter()
                    .map(|shape| WorldShape::place(shape, solved.position, solved.rotation))
                    .collect();
                (definition, shapes)
            }));
        }

        let mut contacts = Vec::new();
        for first in 0..placed.len() {
            let Some((first_definition, first_shapes)) = &placed[first] else {
                continue;
            };
            if first_shapes.is_empty() {
                continue;
            }
            for second in (first + 1)..placed.len() {
                let Some((second_definition, second_shapes)) = &placed[second] else {
                    continue;
                };
                if second_shapes.is_empty()
                    || first_definition
                        .info
                        .collision_group
                        .excludes(second_definition.info.collision_group)
                {
                    continue;
                }
                let reach = first_definition.bounding_radius + second_definition.bounding_radius;
                let gap = solver_bodies[second].position - solver_bodies[first].position;
                if gap.norm_squared() > reach * reach {
                    continue;
                }

                let restitution = first_definition
                    .info
                    .restitution
                    .max(second_definition.info.restitution);
                for a in first_shapes {
                    for b in second_shapes {
                        if let Some(contact) = intersect(a, b) {
                            contacts.push((first, second, restitution, contact));
                        }
                    }
                }
            }
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::{CollisionShape, MomentOfInertia};
    use crate::physics::constraint::{positional_lock, FixedPosition, HingedRod};
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 120.0;

    fn sphere_definition(scene: &mut PhysicsScene, mass: f64, radius: f64) -> BodyDefinitionHandle {
        scene.create_body_definition(BodyDefinition {
            mass,
            moment_of_inertia: MomentOfInertia::solid_sphere(mass, radius),
            collision_shapes: vec![CollisionShape::sphere(Vector3::zeros(), radius)],
            ..Default::default()
        })
    }

    fn spawn(
        scene: &mut PhysicsScene,
        definition: BodyDefinitionHandle,
        at: Vector3<f64>,
    ) -> BodyHandle {
        scene.create_body(BodyInfo {
            name: "Test".to_string(),
            definition,
            position: at,
            rotation: UnitQuaternion::identity(),
        })
    }

    #[test]
    fn test_free_fall() {
        let mut scene = PhysicsScene::default();
        scene.set_gravity(Vector3::new(0.0, -10.0, 0.0));
        let definition = sphere_definition(&mut scene, 1.0, 1.0);
        let body = spawn(&mut scene, definition, Vector3::zeros());

        for _ in 0..120 {
            scene.step(DT);
        }
        let body = scene.body(body).unwrap();
        assert_relative_eq!(body.velocity().y, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_step_is_noop() {
        let mut scene = PhysicsScene::default();
        scene.set_gravity(Vector3::new(0.0, -10.0, 0.0));
        let definition = sphere_definition(&mut scene, 1.0, 1.0);
        let body = spawn(&mut scene, definition, Vector3::new(1.0, 2.0, 3.0));

        assert!(scene.step(0.0).is_empty());
        let body = scene.body(body).unwrap();
        assert_eq!(body.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(body.velocity(), Vector3::zeros());
    }

    #[test]
    fn test_fixed_position_holds_against_gravity() {
        let mut scene = PhysicsScene::default();
        scene.set_gravity(Vector3::new(0.0, -9.8, 0.0));
        let definition = sphere_definition(&mut scene, 100.0, 2.0);
        let anchor = Vector3::new(10.0, 5.0, -3.0);
        let body = spawn(&mut scene, definition, anchor);
        scene.create_single_body_constraint(body, FixedPosition::new(anchor));

        for _ in 0..240 {
            scene.step(DT);
        }
        let position = scene.body(body).unwrap().position();
        assert!((position - anchor).norm() < 0.05, "drifted to {position:?}");
    }

    #[test]
    fn test_positional_lock_carries_secondary_along() {
        let mut scene = PhysicsScene::default();
        let heavy = sphere_definition(&mut scene, 1000.0, 1.0);
        let light = scene.create_body_definition(BodyDefinition {
            mass: 10.0,
            moment_of_inertia: MomentOfInertia::solid_sphere(10.0, 0.4),
            ..Default::default()
        });
        let offset = Vector3::new(3.0, 0.0, -2.0);
        let primary = spawn(&mut scene, heavy, Vector3::zeros());
        let secondary = spawn(&mut scene, light, offset);
        for lock in positional_lock(offset) {
            scene.create_double_body_constraint(primary, secondary, lock);
        }

        scene.set_velocity(primary, Vector3::new(0.0, 0.0, 20.0));
        for _ in 0..120 {
            scene.step(DT);
        }
        // The lock holds the offset in the primary frame; the pair may spin.
        let primary = scene.body(primary).unwrap();
        let secondary = scene.body(secondary).unwrap();
        let local = primary.rotation().inverse() * (secondary.position() - primary.position());
        assert!((local - offset).norm() < 0.1, "offset drifted to {local:?}");
    }

    #[test]
    fn test_rod_keeps_length() {
        let mut scene = PhysicsScene::default();
        scene.set_gravity(Vector3::new(0.0, -9.8, 0.0));
        let anchor_definition = scene.create_body_definition(BodyDefinition {
            mass: 0.0,
            ..Default::default()
        });
        let bob_definition = sphere_definition(&mut scene, 10.0, 1.0);
        let anchor = spawn(&mut scene, anchor_definition, Vector3::zeros());
        let bob = spawn(&mut scene, bob_definition, Vector3::new(4.0, 0.0, 0.0));
        scene.create_double_body_constraint(anchor, bob, HingedRod::new(4.0));

        for _ in 0..240 {
            scene.step(DT);
        }
        let distance = scene.body(bob).unwrap().position().norm();
        assert_relative_eq!(distance, 4.0, epsilon = 0.1);
    }

    #[test]
    fn test_collision_events_report_beginning_once() {
        let mut scene = PhysicsScene::default();
        let definition = sphere_definition(&mut scene, 1.0, 1.0);
        let a = spawn(&mut scene, definition, Vector3::zeros());
        let b = spawn(&mut scene, definition, Vector3::new(1.5, 0.0, 0.0));
        scene.create_single_body_constraint(a, FixedPosition::new(Vector3::zeros()));
        scene.create_single_body_constraint(b, FixedPosition::new(Vector3::new(1.5, 0.0, 0.0)));

        let first = scene.step(DT);
        let second = scene.step(DT);
        assert_eq!(first.len(), 1);
        assert!(first[0].is_beginning);
        assert_eq!(second.len(), 1);
        assert!(!second[0].is_beginning);
        assert_eq!(first[0].partner_of(a), Some(b));
    }

    #[test]
    fn test_same_group_does_not_collide() {
        let mut scene = PhysicsScene::default();
        let group = scene.new_collision_group();
        let definition = scene.create_body_definition(BodyDefinition {
            collision_group: group,
            collision_shapes: vec![CollisionShape::sphere(Vector3::zeros(), 1.0)],
            ..Default::default()
        });
        spawn(&mut scene, definition, Vector3::zeros());
        spawn(&mut scene, definition, Vector3::new(0.5, 0.0, 0.0));

        assert!(scene.step(DT).is_empty());
    }

    #[test]
    fn test_deletion_is_deferred_until_flush() {
        let mut scene = PhysicsScene::default();
        let definition = sphere_definition(&mut scene, 1.0, 1.0);
        let a = spawn(&mut scene, definition, Vector3::zeros());
        let b = spawn(&mut scene, definition, Vector3::new(1.5, 0.0, 0.0));
        scene.create_double_body_constraint(a, b, HingedRod::new(1.5));
        scene.create_single_body_constraint(b, FixedPosition::new(Vector3::new(1.5, 0.0, 0.0)));

        assert!(scene.delete_body(b));
        assert!(!scene.delete_body(b));
        assert!(scene.body(b).unwrap().is_pending_delete());
        assert!(scene.step(DT).is_empty());
        assert_eq!(scene.constraint_count(), 2);

        assert_eq!(scene.flush_deletions(), 1);
        assert!(scene.body(b).is_none());
        assert_eq!(scene.constraint_count(), 0);
        assert_eq!(scene.body_count(), 1);
    }

    #[test]
    fn test_copy_rotation_records_relative_rotation() {
        let mut scene = PhysicsScene::default();
        let definition = sphere_definition(&mut scene, 1.0, 1.0);
        let a = spawn(&mut scene, definition, Vector3::zeros());
        let b = spawn(&mut scene, definition, Vector3::new(5.0, 0.0, 0.0));
        let turned = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5);
        scene.set_rotation(b, turned);

        let handle = scene.create_double_body_constraint(
            a,
            b,
            crate::physics::constraint::CopyRotation::new(),
        );
        match &scene.constraint(handle).unwrap().kind {
            ConstraintKind::CopyRotation(copy) => {
                assert_relative_eq!(copy.relative.unwrap().angle(), 0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected constraint {other:?}"),
        }
    }
}
