//! Keyboard input mapping
//!
//! Key codes follow the DOM `KeyboardEvent.code` names so any windowing layer
//! can forward them unchanged.

use crate::sim::TickInput;

/// Game actions a key can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LaneLeft,
    LaneRight,
    Jump,
    Slide,
    Pause,
}

impl Action {
    /// Action bound to a key code, if any
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Action::LaneLeft),
            "ArrowRight" | "KeyD" => Some(Action::LaneRight),
            "Space" | "ArrowUp" | "KeyW" => Some(Action::Jump),
            "ArrowDown" | "KeyS" => Some(Action::Slide),
            "Escape" | "KeyP" => Some(Action::Pause),
            _ => None,
        }
    }
}

/// Latches key presses between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pending: TickInput,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press; returns the action it mapped to
    pub fn key_down(&mut self, code: &str) -> Option<Action> {
        let action = Action::from_code(code)?;
        self.press(action);
        Some(action)
    }

    pub fn press(&mut self, action: Action) {
        match action {
            Action::LaneLeft => self.pending.lane_left = true,
            Action::LaneRight => self.pending.lane_right = true,
            Action::Jump => self.pending.jump = true,
            Action::Slide => self.pending.slide = true,
            Action::Pause => self.pending.pause = true,
        }
    }

    /// Demo mode stays on until turned off
    pub fn set_idle_mode(&mut self, on: bool) {
        self.pending.idle_mode = on;
    }

    /// Input for the next tick; one-shot presses are consumed
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = self.pending.clone();
        self.pending = TickInput {
            idle_mode: input.idle_mode,
            ..Default::default()
        };
        input
    }

    /// Drop pending presses (e.g. when leaving the game screen)
    pub fn clear(&mut self) {
        self.pending = TickInput {
            idle_mode: self.pending.idle_mode,
            ..Default::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_code("KeyA"), Some(Action::LaneLeft));
        assert_eq!(Action::from_code("ArrowRight"), Some(Action::LaneRight));
        assert_eq!(Action::from_code("Space"), Some(Action::Jump));
        assert_eq!(Action::from_code("ArrowUp"), Some(Action::Jump));
        assert_eq!(Action::from_code("KeyS"), Some(Action::Slide));
        assert_eq!(Action::from_code("Escape"), Some(Action::Pause));
        assert_eq!(Action::from_code("KeyQ"), None);
    }

    #[test]
    fn test_one_shots_consumed_once() {
        let mut input = InputState::new();
        input.key_down("Space");
        input.key_down("ArrowLeft");
        assert_eq!(input.key_down("F1"), None);

        let first = input.take_tick_input();
        assert!(first.jump && first.lane_left);
        assert_eq!(input.take_tick_input(), TickInput::default());
    }

    #[test]
    fn test_idle_mode_sticks() {
        let mut input = InputState::new();
        input.set_idle_mode(true);
        input.press(Action::Pause);
        input.clear();
        let tick = input.take_tick_input();
        assert!(tick.idle_mode);
        assert!(!tick.pause);
        assert!(input.take_tick_input().idle_mode);
    }
}
