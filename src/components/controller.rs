use bevy::prelude::*;

use super::airplane::Airplane;
use crate::physics::PhysicsScene;
use crate::resources::{GamepadSnapshot, KeyAction, KeyboardConfig, KeyboardEvent};

/// Active input source of the airplane. Exactly one drives it at a time.
#[derive(Component, Debug, Clone)]
pub enum FlightController {
    Gamepad(GamepadController),
    Keyboard(KeyboardController),
}

impl FlightController {
    pub fn update(&mut self, airplane: &mut Airplane, scene: &PhysicsScene, dt: f64) {
        let dt = dt.max(0.0);
        match self {
            FlightController::Gamepad(controller) => controller.update(airplane, dt),
            FlightController::Keyboard(controller) => controller.update(airplane, scene, dt),
        }
    }

    /// Returns true when the event was consumed.
    pub fn on_keyboard_event(&mut self, event: &KeyboardEvent) -> bool {
        match self {
            FlightController::Keyboard(controller) => controller.on_keyboard_event(event),
            FlightController::Gamepad(_) => false,
        }
    }

    pub fn is_gamepad(&self) -> bool {
        matches!(self, FlightController::Gamepad(_))
    }
}

/// Direct stick-to-surface mapping. Holds no state besides the last reading.
#[derive(Debug, Clone, Default)]
pub struct GamepadController {
    input: GamepadSnapshot,
}

impl GamepadController {
    pub fn observe(&mut self, input: GamepadSnapshot) {
        self.input = input;
    }

    pub fn update(&mut self, airplane: &mut Airplane, dt: f64) {
        let limits = *airplane.limits();
        let input = &self.input;

        let mut target = airplane.target_thrust();
        if input.action_down {
            target += dt * limits.max_thrust;
        }
        if input.action_left {
            target -= dt * limits.max_thrust;
        }
        airplane.set_target_thrust(target);

        airplane.set_aileron_angle(input.left_stick_x.clamp(-1.0, 1.0) * limits.max_aileron);
        airplane.set_elevator_angle(input.left_stick_y.clamp(-1.0, 1.0) * limits.max_elevator);

        let rudder = input.right_trigger.clamp(0.0, 1.0) - input.left_trigger.clamp(0.0, 1.0);
        airplane.set_rudder_angle(rudder * limits.max_rudder);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlightKey {
    RollLeft,
    RollRight,
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    ThrottleUp,
    ThrottleDown,
}

impl FlightKey {
    fn from_key_code(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(FlightKey::RollLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(FlightKey::RollRight),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(FlightKey::PitchUp),
            KeyCode::KeyW | KeyCode::ArrowUp => Some(FlightKey::PitchDown),
            KeyCode::KeyQ => Some(FlightKey::YawLeft),
            KeyCode::KeyE => Some(FlightKey::YawRight),
            KeyCode::Space => Some(FlightKey::ThrottleUp),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(FlightKey::ThrottleDown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    roll_left: bool,
    roll_right: bool,
    pitch_up: bool,
    pitch_down: bool,
    yaw_left: bool,
    yaw_right: bool,
    throttle_up: bool,
    throttle_down: bool,
}

impl HeldKeys {
    fn slot(&mut self, key: FlightKey) -> &mut bool {
        match key {
            FlightKey::RollLeft => &mut self.roll_left,
            FlightKey::RollRight => &mut self.roll_right,
            FlightKey::PitchUp => &mut self.pitch_up,
            FlightKey::PitchDown => &mut self.pitch_down,
            FlightKey::YawLeft => &mut self.yaw_left,
            FlightKey::YawRight => &mut self.yaw_right,
            FlightKey::ThrottleUp => &mut self.throttle_up,
            FlightKey::ThrottleDown => &mut self.throttle_down,
        }
    }
}

/// Net direction of two opposing keys: -1, 0 or 1.
fn axis(negative: bool, positive: bool) -> f64 {
    f64::from(u8::from(positive)) - f64::from(u8::from(negative))
}

/// Attitude-hold keyboard flying. Held keys move the target bank and flight
/// path angles; the surfaces chase the difference to the actual attitude.
#[derive(Debug, Clone)]
pub struct KeyboardController {
    config: KeyboardConfig,
    held: HeldKeys,
    target_roll: f64,
    target_pitch: f64,
    rudder: f64,
}

impl KeyboardController {
    pub fn new(config: KeyboardConfig) -> Self {
        Self {
            config,
            held: HeldKeys::default(),
            target_roll: 0.0,
            target_pitch: 0.0,
            rudder: 0.0,
        }
    }

    pub fn target_roll(&self) -> f64 {
        self.target_roll
    }

    pub fn target_pitch(&self) -> f64 {
        self.target_pitch
    }

    pub fn rudder(&self) -> f64 {
        self.rudder
    }

    pub fn on_keyboard_event(&mut self, event: &KeyboardEvent) -> bool {
        let Some(key) = FlightKey::from_key_code(event.key) else {
            return false;
        };
        *self.held.slot(key) = event.action == KeyAction::Down;
        true
    }

    pub fn update(&mut self, airplane: &mut Airplane, scene: &PhysicsScene, dt: f64) {
        let limits = *airplane.limits();
        let held = self.held;

        let mut target = airplane.target_thrust();
        target += axis(held.throttle_down, held.throttle_up) * dt * limits.max_thrust;
        airplane.set_target_thrust(target);

        let max_roll = self.config.max_roll_deg.to_radians();
        let roll_rate = self.config.roll_rate_deg.to_radians();
        self.target_roll += axis(held.roll_left, held.roll_right) * roll_rate * dt;
        self.target_roll = self.target_roll.clamp(-max_roll, max_roll);

        let max_pitch = self.config.max_pitch_deg.to_radians();
        let pitch_rate = self.config.pitch_rate_deg.to_radians();
        self.target_pitch += axis(held.pitch_down, held.pitch_up) * pitch_rate * dt;
        self.target_pitch = self.target_pitch.clamp(-max_pitch, max_pitch);

        let yaw = axis(held.yaw_left, held.yaw_right);
        if yaw != 0.0 {
            self.rudder += yaw * self.config.rudder_rate_deg.to_radians() * dt;
            self.rudder = self.rudder.clamp(-limits.max_rudder, limits.max_rudder);
        } else {
            let restore = self.config.rudder_restore_deg.to_radians() * dt;
            if self.rudder > 0.0 {
                self.rudder = (self.rudder - restore).max(0.0);
            } else if self.rudder < 0.0 {
                self.rudder = (self.rudder + restore).min(0.0);
            }
        }
        airplane.set_rudder_angle(self.rudder);

        let Some(torso) = scene.body(airplane.rig.torso) else {
            return;
        };

        let bank = torso.orientation_x().y.clamp(-1.0, 1.0).asin();
        airplane.set_aileron_angle(self.target_roll - bank);

        let velocity = torso.velocity();
        if velocity.norm() > self.config.min_airspeed {
            let horizontal = velocity.x.hypot(velocity.z);
            let flight_path = velocity.y.atan2(horizontal);
            airplane.set_elevator_angle(self.target_pitch - flight_path);
        }
    }
}
