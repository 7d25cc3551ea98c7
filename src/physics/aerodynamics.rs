use nalgebra::{UnitQuaternion, Vector3};

use super::body::AerodynamicSurface;

/// Below this airspeed a surface produces no force.
const MIN_AIRSPEED: f64 = 1e-3;

/// Force and torque (about the body origin) of one flat-plate surface.
///
/// The plate resists motion along its normal in proportion to the lift
/// coefficient and adds parasitic drag against the local airflow.
pub fn surface_force(
    surface: &AerodynamicSurface,
    rotation: UnitQuaternion<f64>,
    velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    air_density: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let arm = rotation * surface.offset;
    let local_velocity = velocity + angular_velocity.cross(&arm);
    let airspeed = local_velocity.norm();
    if airspeed < MIN_AIRSPEED {
        return (Vector3::zeros(), Vector3::zeros());
    }

    let normal = rotation * surface.rotation * Vector3::y();
    let half_rho = 0.5 * air_density;
    let normal_speed = local_velocity.dot(&normal);

    let pressure = half_rho * airspeed * surface.area;
    let lift = -normal * (pressure * normal_speed * surface.lift_coefficient);
    let drag = -local_velocity * (pressure * surface.drag_coefficient);

    let force = lift + drag;
    (force, arm.cross(&force))
}
