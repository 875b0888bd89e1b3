//! Gravity and lock delay
//!
//! A small state machine deciding, tick by tick, whether the active piece
//! falls a row, waits on the ground, or locks. It only sees elapsed time and
//! whether the piece could fall; the session applies the outcome.

use crate::config::SessionConfig;
use serde::Serialize;

/// Where the active piece is in its fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LockPhase {
    #[default]
    Falling,
    /// Resting on something, lock delay running
    Grounded,
}

/// What the session should do with the piece this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait,
    Fall,
    Lock,
}

#[derive(Debug, Clone)]
pub struct LockController {
    /// Seconds per row under gravity
    interval: f32,
    min_interval: f32,
    step: f32,
    fall_timer: f32,
    lock_timer: f32,
    lock_delay: f32,
    resets: u32,
    max_resets: u32,
    phase: LockPhase,
}

impl LockController {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            interval: config.difficulty.gravity_interval(),
            min_interval: config.min_gravity_interval,
            step: config.gravity_step,
            fall_timer: 0.0,
            lock_timer: 0.0,
            lock_delay: config.lock_delay,
            resets: 0,
            max_resets: config.max_lock_resets,
            phase: LockPhase::Falling,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn phase(&self) -> LockPhase {
        self.phase
    }

    pub fn resets_used(&self) -> u32 {
        self.resets
    }

    /// Advance the timers by `dt`. `can_fall` says whether the piece fits one row lower.
    pub fn tick(&mut self, dt: f32, can_fall: bool) -> Step {
        if can_fall {
            if self.phase == LockPhase::Grounded {
                self.phase = LockPhase::Falling;
                self.lock_timer = 0.0;
                self.resets = 0;
            }
            self.fall_timer += dt;
            if self.fall_timer > self.interval {
                self.fall_timer = 0.0;
                return Step::Fall;
            }
            return Step::Wait;
        }

        match self.phase {
            LockPhase::Falling => {
                self.phase = LockPhase::Grounded;
                self.lock_timer = 0.0;
                self.resets = 0;
            }
            LockPhase::Grounded => self.lock_timer += dt,
        }

        if self.lock_timer > self.lock_delay || self.resets >= self.max_resets {
            Step::Lock
        } else {
            Step::Wait
        }
    }

    /// A move or rotation succeeded. While grounded this restarts the lock
    /// delay, at most `max_lock_resets` times per piece.
    pub fn on_manipulation(&mut self) {
        if self.phase == LockPhase::Grounded && self.resets < self.max_resets {
            self.resets += 1;
            self.lock_timer = 0.0;
        }
    }

    /// The piece stepped down by soft drop; the next gravity row starts over
    pub fn restart_fall(&mut self) {
        self.fall_timer = 0.0;
    }

    /// Fresh piece: back to falling with all timers cleared
    pub fn reset(&mut self) {
        self.phase = LockPhase::Falling;
        self.fall_timer = 0.0;
        self.lock_timer = 0.0;
        self.resets = 0;
    }

    /// Make gravity faster by one step per level gained, never past the floor
    pub fn speed_up(&mut self, levels: u32) {
        if levels == 0 {
            return;
        }
        self.interval = (self.interval - self.step * levels as f32).max(self.min_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;

    fn controller() -> LockController {
        LockController::new(&SessionConfig::with_difficulty(Difficulty::Normal))
    }

    #[test]
    fn test_falls_once_interval_passes() {
        let mut lock = controller();
        assert_eq!(lock.tick(0.5, true), Step::Wait);
        assert_eq!(lock.tick(0.31, true), Step::Fall);
        // timer restarted after the fall
        assert_eq!(lock.tick(0.5, true), Step::Wait);
    }

    #[test]
    fn test_locks_after_delay() {
        let mut lock = controller();
        assert_eq!(lock.tick(0.1, false), Step::Wait);
        assert_eq!(lock.phase(), LockPhase::Grounded);
        assert_eq!(lock.tick(0.3, false), Step::Wait);
        assert_eq!(lock.tick(0.21, false), Step::Lock);
    }

    #[test]
    fn test_manipulation_restarts_delay() {
        let mut lock = controller();
        lock.tick(0.0, false);
        lock.tick(0.45, false);
        lock.on_manipulation();
        assert_eq!(lock.resets_used(), 1);
        assert_eq!(lock.tick(0.45, false), Step::Wait);
        assert_eq!(lock.tick(0.1, false), Step::Lock);
    }

    #[test]
    fn test_manipulation_while_falling_is_free() {
        let mut lock = controller();
        lock.on_manipulation();
        assert_eq!(lock.resets_used(), 0);
    }

    #[test]
    fn test_reset_cap_forces_lock() {
        let mut lock = controller();
        lock.tick(0.0, false);
        for _ in 0..15 {
            lock.on_manipulation();
        }
        assert_eq!(lock.resets_used(), 15);
        lock.on_manipulation();
        assert_eq!(lock.resets_used(), 15);
        assert_eq!(lock.tick(0.0, false), Step::Lock);
    }

    #[test]
    fn test_leaving_ground_clears_lock_state() {
        let mut lock = controller();
        lock.tick(0.0, false);
        lock.tick(0.4, false);
        lock.on_manipulation();
        lock.tick(0.01, true);
        assert_eq!(lock.phase(), LockPhase::Falling);
        assert_eq!(lock.resets_used(), 0);
        // grounded again: a full delay is available
        lock.tick(0.0, false);
        assert_eq!(lock.tick(0.45, false), Step::Wait);
    }

    #[test]
    fn test_speed_up_stops_at_floor() {
        let mut lock = controller();
        lock.speed_up(1);
        assert!((lock.interval() - 0.72).abs() < 1e-6);
        lock.speed_up(100);
        assert_eq!(lock.interval(), 0.1);
        lock.speed_up(1);
        assert_eq!(lock.interval(), 0.1);
    }
}
