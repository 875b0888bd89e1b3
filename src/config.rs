//! Difficulty presets and timing configuration for a session

use serde::{Deserialize, Serialize};

/// Starting difficulty, selecting the initial gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Seconds per row before any level-based speed-up
    pub fn gravity_interval(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 0.8,
            Difficulty::Hard => 0.5,
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }
}

/// Timing and layout knobs for one session. All times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Delayed Auto Shift: how long a direction is held before it repeats
    pub das: f32,
    /// Auto Repeat Rate: time between repeats, 0 shifts to the wall at once
    pub arr: f32,
    /// Time between soft-drop steps while down is held
    pub soft_drop_interval: f32,
    /// Grace period once the piece is grounded
    pub lock_delay: f32,
    /// Successful moves/rotations allowed to restart the lock delay
    pub max_lock_resets: u32,
    /// Gravity speed-up per level gained
    pub gravity_step: f32,
    /// Gravity never gets faster than this
    pub min_gravity_interval: f32,
    /// Upcoming pieces exposed beyond the immediate next piece
    pub preview_len: usize,
    /// Longest time step a single `advance` call accepts
    pub max_dt: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            das: 0.133,
            arr: 0.0,
            soft_drop_interval: 0.03,
            lock_delay: 0.5,
            max_lock_resets: 15,
            gravity_step: 0.08,
            min_gravity_interval: 0.1,
            preview_len: 4,
            max_dt: 0.25,
        }
    }
}

impl SessionConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}
