use nalgebra::{UnitQuaternion, Vector3};

use crate::physics::{
    AerodynamicSurface, BodyDefinition, CollisionGroup, CollisionShape, MomentOfInertia,
};

// TODO: tune drag factors together with the thrust nudge; every part flies
// with zero linear and angular drag for now.

pub fn torso(group: CollisionGroup) -> BodyDefinition {
    let box_at = |x: f64, y: f64, z: f64, size: Vector3<f64>| {
        CollisionShape::cuboid(Vector3::new(x, y, z), UnitQuaternion::identity(), size)
    };
    BodyDefinition {
        mass: 1500.0,
        moment_of_inertia: MomentOfInertia::symmetric(1500.0 / 2.0),
        restitution: 0.0,
        collision_group: group,
        collision_shapes: vec![
            box_at(0.0, 0.0, -1.75, Vector3::new(1.6, 1.5, 16.0)), // fuselage
            box_at(4.8, 0.0, -1.7, Vector3::new(8.0, 0.3, 2.3)),   // left wing
            box_at(-4.8, 0.0, -1.7, Vector3::new(8.0, 0.3, 2.3)),  // right wing
            box_at(0.0, 0.75, -8.7, Vector3::new(6.6, 2.3, 2.0)),  // tail
        ],
        aerodynamic_surfaces: vec![AerodynamicSurface::new(
            Vector3::new(0.0, 0.0, -1.7),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), (-5.0f64).to_radians()),
            16.0,
            0.1,
            2.4,
        )],
        ..Default::default()
    }
}

fn surface(
    mass: f64,
    inertia_mass: f64,
    group: CollisionGroup,
    plate: AerodynamicSurface,
) -> BodyDefinition {
    BodyDefinition {
        mass,
        moment_of_inertia: MomentOfInertia::solid_sphere(inertia_mass, 0.4),
        collision_group: group,
        aerodynamic_surfaces: vec![plate],
        ..Default::default()
    }
}

/// Shared by both ailerons.
pub fn aileron(group: CollisionGroup) -> BodyDefinition {
    surface(
        25.0,
        50.0,
        group,
        AerodynamicSurface::new(
            Vector3::new(0.0, 0.0, -0.4),
            UnitQuaternion::identity(),
            3.0,
            0.1,
            1.1,
        ),
    )
}

pub fn elevator(group: CollisionGroup) -> BodyDefinition {
    surface(
        50.0,
        100.0,
        group,
        AerodynamicSurface::new(
            Vector3::new(0.0, 0.0, -0.4),
            UnitQuaternion::identity(),
            4.4,
            0.1,
            0.8,
        ),
    )
}

pub fn rudder(group: CollisionGroup) -> BodyDefinition {
    // Vertical plate: the normal points sideways.
    surface(
        25.0,
        100.0,
        group,
        AerodynamicSurface::new(
            Vector3::zeros(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90.0f64.to_radians()),
            2.0,
            0.1,
            1.0,
        ),
    )
}

pub fn counterweight(group: CollisionGroup) -> BodyDefinition {
    BodyDefinition {
        mass: 100.0,
        moment_of_inertia: MomentOfInertia::solid_sphere(10.0, 0.4),
        collision_group: group,
        ..Default::default()
    }
}

pub fn hinge(group: CollisionGroup) -> BodyDefinition {
    BodyDefinition {
        mass: 1.0,
        moment_of_inertia: MomentOfInertia::symmetric(1.0),
        collision_group: group,
        ..Default::default()
    }
}

pub fn ball(group: CollisionGroup) -> BodyDefinition {
    BodyDefinition {
        mass: 10.0,
        moment_of_inertia: MomentOfInertia::symmetric(10.0 / 2.0),
        collision_group: group,
        collision_shapes: vec![CollisionShape::sphere(Vector3::zeros(), 1.0)],
        ..Default::default()
    }
}

/// Cows share one group so a tight herd never pushes itself apart.
pub fn cow(group: CollisionGroup) -> BodyDefinition {
    BodyDefinition {
        mass: 50.0,
        moment_of_inertia: MomentOfInertia::solid_sphere(50.0, 1.5),
        collision_group: group,
        collision_shapes: vec![CollisionShape::sphere(Vector3::new(0.0, 1.0, 0.0), 1.5)],
        ..Default::default()
    }
}
