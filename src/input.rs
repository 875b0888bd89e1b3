//! Logical intents and DAS (Delayed Auto Shift) / ARR (Auto Repeat Rate)
//!
//! The host reports press and release edges for the three repeatable
//! directions; the repeat controller turns held time into discrete steps.

use crate::config::SessionConfig;
use serde::Serialize;

/// A direction that repeats while held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Left,
    Right,
    /// Soft drop
    Down,
}

/// Input intents the session can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    /// Direction pressed: one immediate step, then repeats while held
    Press(Direction),
    Release(Direction),
    HardDrop,
    Rotate,
    Hold,
    PauseToggle,
}

impl Intent {
    pub const MOVE_LEFT: Intent = Intent::Press(Direction::Left);
    pub const MOVE_RIGHT: Intent = Intent::Press(Direction::Right);
    pub const SOFT_DROP: Intent = Intent::Press(Direction::Down);
}

/// Repeat steps produced by one update. `u32::MAX` means "as far as it goes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Repeats {
    pub left: u32,
    pub right: u32,
    pub down: u32,
}

#[derive(Debug, Clone, Default)]
struct KeyPressState {
    held_for: f32,
    das_triggered: bool,
    since_repeat: f32,
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    das: f32,
    arr: f32,
}

/// Held-direction tracker with DAS/ARR support
#[derive(Debug, Clone)]
pub struct RepeatController {
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
    shift: Timing,
    soft_drop: Timing,
}

impl RepeatController {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            left_state: None,
            right_state: None,
            down_state: None,
            shift: Timing {
                das: config.das,
                arr: config.arr,
            },
            // soft drop repeats at a steady rate from the first step
            soft_drop: Timing {
                das: config.soft_drop_interval,
                arr: config.soft_drop_interval,
            },
        }
    }

    /// Register a press edge. Returns false if the direction was already
    /// held, in which case no immediate step should happen.
    pub fn press(&mut self, direction: Direction) -> bool {
        let slot = match direction {
            Direction::Left => {
                // Cancel opposite direction
                self.right_state = None;
                &mut self.left_state
            }
            Direction::Right => {
                self.left_state = None;
                &mut self.right_state
            }
            Direction::Down => &mut self.down_state,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(KeyPressState::default());
        true
    }

    pub fn release(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.left_state = None,
            Direction::Right => self.right_state = None,
            Direction::Down => self.down_state = None,
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.left_state.is_some(),
            Direction::Right => self.right_state.is_some(),
            Direction::Down => self.down_state.is_some(),
        }
    }

    /// Advance held keys by `dt` and return the repeat steps that came due
    pub fn update(&mut self, dt: f32) -> Repeats {
        let (shift, soft_drop) = (self.shift, self.soft_drop);
        Repeats {
            left: self.left_state.as_mut().map_or(0, |s| process_das_arr(s, dt, shift)),
            right: self.right_state.as_mut().map_or(0, |s| process_das_arr(s, dt, shift)),
            down: self.down_state.as_mut().map_or(0, |s| process_das_arr(s, dt, soft_drop)),
        }
    }

    /// Clear all held keys (pause, new session)
    pub fn clear(&mut self) {
        self.left_state = None;
        self.right_state = None;
        self.down_state = None;
    }
}

/// Process DAS/ARR for one held key, returning how many steps to take
fn process_das_arr(state: &mut KeyPressState, dt: f32, timing: Timing) -> u32 {
    state.held_for += dt;
    if state.held_for < timing.das {
        return 0;
    }

    let mut steps = 0;
    if !state.das_triggered {
        // First trigger after DAS
        state.das_triggered = true;
        state.since_repeat = 0.0;
        steps = 1;
    } else {
        state.since_repeat += dt;
    }

    if timing.arr <= 0.0 {
        return u32::MAX;
    }
    while state.since_repeat >= timing.arr {
        state.since_repeat -= timing.arr;
        steps += 1;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(das: f32, arr: f32) -> RepeatController {
        RepeatController::new(&SessionConfig {
            das,
            arr,
            soft_drop_interval: 0.05,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn test_press_is_edge_triggered() {
        let mut input = controller(0.1, 0.05);
        assert!(input.press(Direction::Left));
        assert!(!input.press(Direction::Left));
        input.release(Direction::Left);
        assert!(input.press(Direction::Left));
    }

    #[test]
    fn test_opposite_direction_cancels() {
        let mut input = controller(0.1, 0.05);
        input.press(Direction::Left);
        input.press(Direction::Right);
        assert!(!input.is_held(Direction::Left));
        assert!(input.is_held(Direction::Right));
    }

    #[test]
    fn test_das_then_arr() {
        let mut input = controller(0.1, 0.05);
        input.press(Direction::Right);
        assert_eq!(input.update(0.05).right, 0);
        assert_eq!(input.update(0.06).right, 1); // DAS charged
        assert_eq!(input.update(0.03).right, 0);
        assert_eq!(input.update(0.03).right, 1);
        assert_eq!(input.update(0.1).right, 2);
    }

    #[test]
    fn test_zero_arr_slides_to_wall() {
        let mut input = controller(0.1, 0.0);
        input.press(Direction::Left);
        assert_eq!(input.update(0.05).left, 0);
        assert_eq!(input.update(0.06).left, u32::MAX);
        assert_eq!(input.update(0.016).left, u32::MAX);
    }

    #[test]
    fn test_soft_drop_repeats_at_its_own_rate() {
        let mut input = controller(0.5, 0.5);
        input.press(Direction::Down);
        assert_eq!(input.update(0.05).down, 1);
        assert_eq!(input.update(0.12).down, 2);
        let repeats = input.update(0.01);
        assert_eq!((repeats.left, repeats.right), (0, 0));
    }

    #[test]
    fn test_release_stops_repeats() {
        let mut input = controller(0.1, 0.05);
        input.press(Direction::Left);
        input.update(0.2);
        input.release(Direction::Left);
        assert_eq!(input.update(1.0), Repeats::default());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = controller(0.1, 0.05);
        input.press(Direction::Left);
        input.press(Direction::Down);
        input.clear();
        assert!(!input.is_held(Direction::Left));
        assert!(!input.is_held(Direction::Down));
    }
}
