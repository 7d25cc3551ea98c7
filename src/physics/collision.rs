use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use super::body::{BodyHandle, CollisionShape};

/// Contact report for a body pair, emitted every step the pair touches.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyCollision {
    pub first: BodyHandle,
    pub second: BodyHandle,
    /// True on the first step of a contact.
    pub is_beginning: bool,
}

impl BodyCollision {
    /// Returns the partner of `body` if it takes part in this collision.
    pub fn partner_of(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.first == body {
            Some(self.second)
        } else if self.second == body {
            Some(self.first)
        } else {
            None
        }
    }
}

/// World-space contact between two shapes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Contact {
    /// Contact point in world space.
    pub point: Vector3<f64>,
    /// Unit normal pointing from the first body towards the second.
    pub normal: Vector3<f64>,
    pub depth: f64,
}

/// Shape placed in world space.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WorldShape {
    Sphere {
        center: Vector3<f64>,
        radius: f64,
    },
    Box {
        center: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
        half_extents: Vector3<f64>,
    },
}

impl WorldShape {
    pub fn place(
        shape: &CollisionShape,
        position: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        match shape {
            CollisionShape::Sphere { center, radius } => WorldShape::Sphere {
                center: position + rotation * center,
                radius: *radius,
            },
            CollisionShape::Box {
                center,
                rotation: local,
                size,
            } => WorldShape::Box {
                center: position + rotation * center,
                rotation: rotation * local,
                half_extents: size / 2.0,
            },
        }
    }
}

/// Narrow phase. Box/box pairs are not reported.
pub(crate) fn intersect(first: &WorldShape, second: &WorldShape) -> Option<Contact> {
    match (*first, *second) {
        (
            WorldShape::Sphere {
                center: a,
                radius: ra,
            },
            WorldShape::Sphere {
                center: b,
                radius: rb,
            },
        ) => sphere_sphere(a, ra, b, rb),
        (
            WorldShape::Box {
                center,
                rotation,
                half_extents,
            },
            WorldShape::Sphere {
                center: sphere,
                radius,
            },
        ) => box_sphere(center, rotation, half_extents, sphere, radius),
        (
            WorldShape::Sphere {
                center: sphere,
                radius,
            },
            WorldShape::Box {
                center,
                rotation,
                half_extents,
            },
        ) => box_sphere(center, rotation, half_extents, sphere, radius).map(|contact| Contact {
            normal: -contact.normal,
            ..contact
        }),
        (WorldShape::Box { .. }, WorldShape::Box { .. }) => None,
    }
}

fn sphere_sphere(a: Vector3<f64>, ra: f64, b: Vector3<f64>, rb: f64) -> Option<Contact> {
    let delta = b - a;
    let distance = delta.norm();
    let depth = ra + rb - distance;
    if depth <= 0.0 {
        return None;
    }
    let normal = delta.try_normalize(1e-9).unwrap_or_else(Vector3::y);
    Some(Contact {
        point: a + normal * (ra - depth / 2.0),
        normal,
        depth,
    })
}

fn box_sphere(
    center: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    half_extents: Vector3<f64>,
    sphere: Vector3<f64>,
    radius: f64,
) -> Option<Contact> {
    let local = rotation.inverse() * (sphere - center);
    let closest = Vector3::new(
        local.x.clamp(-half_extents.x, half_extents.x),
        local.y.clamp(-half_extents.y, half_extents.y),
        local.z.clamp(-half_extents.z, half_extents.z),
    );
    let delta = local - closest;
    let distance = delta.norm();

    if distance > 1e-9 {
        if distance >= radius {
            return None;
        }
        return Some(Contact {
            point: center + rotation * closest,
            normal: rotation * (delta / distance),
            depth: radius - distance,
        });
    }

    // Sphere centre inside the box: push out through the nearest face.
    let gaps = half_extents - local.abs();
    let (axis, gap) = (0..3)
        .map(|i| (i, gaps[i]))
        .fold((0, f64::MAX), |best, candidate| {
            if candidate.1 < best.1 {
                candidate
            } else {
                best
            }
        });
    let mut local_normal = Vector3::zeros();
    local_normal[axis] = if local[axis] >= 0.0 { 1.0 } else { -1.0 };
    Some(Contact {
        point: sphere,
        normal: rotation * local_normal,
        depth: gap + radius,
    })
}
