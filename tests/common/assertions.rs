use barnstorm::physics::Body;
use nalgebra::Vector3;

#[track_caller]
pub fn assert_vector_eq(actual: Vector3<f64>, expected: Vector3<f64>, epsilon: f64) {
    assert!(
        (actual - expected).norm() <= epsilon,
        "expected {:?}, got {:?} (epsilon {})",
        expected,
        actual,
        epsilon
    );
}

/// Assert that a body's state has not blown up
#[track_caller]
pub fn assert_body_finite(body: &Body) {
    assert!(
        body.position().iter().all(|x| x.is_finite()),
        "Position of {} is not finite",
        body.name()
    );
    assert!(
        body.velocity().iter().all(|x| x.is_finite()),
        "Velocity of {} is not finite",
        body.name()
    );
    assert!(
        body.angular_velocity().iter().all(|x| x.is_finite()),
        "Angular velocity of {} is not finite",
        body.name()
    );
}
