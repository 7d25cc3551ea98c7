use bevy::input::gamepad::{Gamepad, GamepadAxis, GamepadButton};
use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

/// Key transition delivered to the keyboard controller.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: KeyCode,
    pub action: KeyAction,
}

impl KeyboardEvent {
    pub fn down(key: KeyCode) -> Self {
        Self {
            key,
            action: KeyAction::Down,
        }
    }

    pub fn up(key: KeyCode) -> Self {
        Self {
            key,
            action: KeyAction::Up,
        }
    }
}

impl From<&KeyboardInput> for KeyboardEvent {
    fn from(input: &KeyboardInput) -> Self {
        Self {
            key: input.key_code,
            action: KeyAction::from(input.state),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

impl From<ButtonState> for KeyAction {
    fn from(state: ButtonState) -> Self {
        match state {
            ButtonState::Pressed => KeyAction::Down,
            ButtonState::Released => KeyAction::Up,
        }
    }
}

/// Latest state of the first gamepad. Axes lie in [-1, 1], triggers in [0, 1].
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub connected: bool,
    /// South face button (A / Cross).
    pub action_down: bool,
    /// West face button (X / Square).
    pub action_left: bool,
    pub left_stick_x: f64,
    pub left_stick_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
}

impl GamepadSnapshot {
    /// Reads the buttons and axes the flight controller cares about.
    pub fn from_gamepad(gamepad: &Gamepad) -> Self {
        let axis = |input: GamepadAxis| f64::from(gamepad.get(input).unwrap_or(0.0));
        let trigger = |input: GamepadButton| f64::from(gamepad.get(input).unwrap_or(0.0));
        Self {
            connected: true,
            action_down: gamepad.pressed(GamepadButton::South),
            action_left: gamepad.pressed(GamepadButton::West),
            left_stick_x: axis(GamepadAxis::LeftStickX),
            left_stick_y: axis(GamepadAxis::LeftStickY),
            left_trigger: trigger(GamepadButton::LeftTrigger2),
            right_trigger: trigger(GamepadButton::RightTrigger2),
        }
    }
}
