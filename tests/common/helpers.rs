use barnstorm::resources::{GameConfig, SessionRng};
use barnstorm::PlayController;
use nalgebra::Vector3;
use std::time::Duration;

pub const DT: f64 = 1.0 / 120.0;

/// Host frame used when driving a controller through longer spans.
pub const FRAME: Duration = Duration::from_millis(10);

/// Feeds `duration` to the controller in short host frames.
pub fn run_for(controller: &mut PlayController, duration: Duration) {
    let frames = duration.as_millis() / FRAME.as_millis();
    for _ in 0..frames {
        controller.update(FRAME);
    }
}

pub fn airplane_spawn() -> Vector3<f64> {
    Vector3::new(0.0, 100.0, 0.0)
}

/// Ball rest position under [`airplane_spawn`] with the default skeleton.
pub fn ball_spawn() -> Vector3<f64> {
    airplane_spawn() + Vector3::new(0.0, -8.0, 0.0)
}

/// Cow anchor whose collision sphere is centred on `point`.
pub fn cow_centred_on(point: Vector3<f64>) -> Vector3<f64> {
    point - Vector3::new(0.0, 1.0, 0.0)
}

/// Cows scattered through the default spawn volume, kept clear of the rig.
pub fn scattered_cows(count: usize, seed: u64) -> Vec<Vector3<f64>> {
    let (min, max) = GameConfig::default().session.spawn_volume();
    let mut rng = SessionRng::new(Some(seed));
    let mut cows = Vec::with_capacity(count);
    while cows.len() < count {
        let position = rng.point_in(min, max);
        if (position - airplane_spawn()).norm() > 40.0 {
            cows.push(position);
        }
    }
    cows
}

pub fn config_with(defeat_after_secs: f64, cow_count: usize) -> GameConfig {
    let mut config = GameConfig::default();
    config.session.defeat_after_secs = defeat_after_secs;
    config.session.cow_count = cow_count;
    config.session.seed = Some(11);
    config
}
