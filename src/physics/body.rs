use bevy::prelude::*;
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::arena::ArenaIndex;

/// Handle to a body living in a [`super::PhysicsScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) ArenaIndex);

/// Handle to a shared body definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyDefinitionHandle(pub(crate) usize);

/// Bodies sharing a non-zero group never collide with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionGroup(pub u32);

impl CollisionGroup {
    pub const NONE: CollisionGroup = CollisionGroup(0);

    pub fn excludes(&self, other: CollisionGroup) -> bool {
        self.0 != 0 && self.0 == other.0
    }
}

/// Inertia tensor helpers.
pub struct MomentOfInertia;

impl MomentOfInertia {
    pub fn symmetric(value: f64) -> Matrix3<f64> {
        Matrix3::from_diagonal_element(value)
    }

    pub fn solid_sphere(mass: f64, radius: f64) -> Matrix3<f64> {
        Self::symmetric(2.0 / 5.0 * mass * radius * radius)
    }
}

/// Collision geometry in body-local coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CollisionShape {
    Sphere {
        center: Vector3<f64>,
        radius: f64,
    },
    Box {
        center: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
        /// Full edge lengths.
        size: Vector3<f64>,
    },
}

impl CollisionShape {
    pub fn sphere(center: Vector3<f64>, radius: f64) -> Self {
        CollisionShape::Sphere { center, radius }
    }

    pub fn cuboid(center: Vector3<f64>, rotation: UnitQuaternion<f64>, size: Vector3<f64>) -> Self {
        CollisionShape::Box {
            center,
            rotation,
            size,
        }
    }

    /// Radius around the body origin that encloses the shape.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            CollisionShape::Sphere { center, radius } => center.norm() + radius,
            CollisionShape::Box { center, size, .. } => center.norm() + size.norm() / 2.0,
        }
    }
}

/// Flat-plate surface fed to the aerodynamics pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AerodynamicSurface {
    /// Surface origin in body coordinates.
    pub offset: Vector3<f64>,
    /// Surface orientation; the plate normal is the rotated +Y axis.
    pub rotation: UnitQuaternion<f64>,
    pub area: f64,
    pub drag_coefficient: f64,
    pub lift_coefficient: f64,
}

impl AerodynamicSurface {
    pub fn new(
        offset: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
        area: f64,
        drag_coefficient: f64,
        lift_coefficient: f64,
    ) -> Self {
        Self {
            offset,
            rotation,
            area,
            drag_coefficient,
            lift_coefficient,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BodyDefinition {
    pub mass: f64,
    pub moment_of_inertia: Matrix3<f64>,
    pub drag_factor: f64,
    pub angular_drag_factor: f64,
    pub restitution: f64,
    pub collision_group: CollisionGroup,
    pub collision_shapes: Vec<CollisionShape>,
    pub aerodynamic_surfaces: Vec<AerodynamicSurface>,
}

impl Default for BodyDefinition {
    fn default() -> Self {
        Self {
            mass: 1.0,
            moment_of_inertia: MomentOfInertia::symmetric(1.0),
            drag_factor: 0.0,
            angular_drag_factor: 0.0,
            restitution: 0.0,
            collision_group: CollisionGroup::NONE,
            collision_shapes: Vec::new(),
            aerodynamic_surfaces: Vec::new(),
        }
    }
}

/// Definition plus the derived quantities the solver needs every step.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedDefinition {
    pub info: BodyDefinition,
    pub inverse_mass: f64,
    pub inverse_inertia: Matrix3<f64>,
    pub bounding_radius: f64,
}

impl ResolvedDefinition {
    pub fn new(info: BodyDefinition) -> Self {
        let inverse_mass = if info.mass > 0.0 { 1.0 / info.mass } else { 0.0 };
        // Massless definitions are static.
        let inverse_inertia = if inverse_mass == 0.0 {
            Matrix3::zeros()
        } else {
            info.moment_of_inertia.try_inverse().unwrap_or_else(|| {
                error!("Moment of inertia is not invertible, body will not rotate");
                Matrix3::zeros()
            })
        };
        let bounding_radius = info
            .collision_shapes
            .iter()
            .map(CollisionShape::bounding_radius)
            .fold(0.0, f64::max);
        Self {
            info,
            inverse_mass,
            inverse_inertia,
            bounding_radius,
        }
    }
}

/// Parameters for creating a body.
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub name: String,
    pub definition: BodyDefinitionHandle,
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) name: String,
    pub(crate) definition: BodyDefinitionHandle,
    pub(crate) position: Vector3<f64>,
    pub(crate) rotation: UnitQuaternion<f64>,
    /// World frame [m/s]
    pub(crate) velocity: Vector3<f64>,
    /// World frame [rad/s]
    pub(crate) angular_velocity: Vector3<f64>,
    pub(crate) pending_delete: bool,
}

impl Body {
    pub(crate) fn new(info: BodyInfo) -> Self {
        Self {
            name: info.name,
            definition: info.definition,
            position: info.position,
            rotation: info.rotation,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            pending_delete: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Body-local axis expressed in world space.
    pub fn orientation_x(&self) -> Vector3<f64> {
        self.rotation * Vector3::x()
    }

    pub fn orientation_y(&self) -> Vector3<f64> {
        self.rotation * Vector3::y()
    }

    pub fn orientation_z(&self) -> Vector3<f64> {
        self.rotation * Vector3::z()
    }

    pub fn is_pending_delete(&self) -> bool {
        self.pending_delete
    }
}
