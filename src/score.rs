//! Scoring: line clears, combos, back-to-back, T-spins and perfect clears

use crate::board::Board;
use crate::piece::Piece;
use serde::Serialize;

/// Flat bonus for leaving the playfield empty
pub const PERFECT_CLEAR_BONUS: u64 = 3000;
/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Type of line clear for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClearKind {
    Single,
    Double,
    Triple,
    Tetris,
    TSpinSingle,
    TSpinDouble,
    /// Also covers a T-spin clearing four lines
    TSpinTriple,
}

impl ClearKind {
    /// Classify a lock that cleared `lines` (at least one)
    pub fn classify(lines: u8, t_spin: bool) -> Option<ClearKind> {
        let kind = match (t_spin, lines) {
            (_, 0) => return None,
            (false, 1) => ClearKind::Single,
            (false, 2) => ClearKind::Double,
            (false, 3) => ClearKind::Triple,
            (false, _) => ClearKind::Tetris,
            (true, 1) => ClearKind::TSpinSingle,
            (true, 2) => ClearKind::TSpinDouble,
            (true, _) => ClearKind::TSpinTriple,
        };
        Some(kind)
    }

    /// Points before combo and back-to-back multipliers
    pub fn base_score(&self) -> u64 {
        match self {
            ClearKind::Single => 100,
            ClearKind::Double => 300,
            ClearKind::Triple => 500,
            ClearKind::Tetris => 800,
            ClearKind::TSpinSingle => 800,
            ClearKind::TSpinDouble => 1200,
            ClearKind::TSpinTriple => 1600,
        }
    }

    /// Tetrises and T-spin clears build and keep a back-to-back chain
    pub fn is_difficult(&self) -> bool {
        !matches!(self, ClearKind::Single | ClearKind::Double | ClearKind::Triple)
    }

    pub fn is_t_spin(&self) -> bool {
        matches!(
            self,
            ClearKind::TSpinSingle | ClearKind::TSpinDouble | ClearKind::TSpinTriple
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClearKind::Single => "Single",
            ClearKind::Double => "Double",
            ClearKind::Triple => "Triple",
            ClearKind::Tetris => "Tetris",
            ClearKind::TSpinSingle => "T-Spin Single",
            ClearKind::TSpinDouble => "T-Spin Double",
            ClearKind::TSpinTriple => "T-Spin Triple",
        }
    }
}

/// What happened when a piece locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockEvent {
    pub lines: u8,
    pub t_spin: bool,
    /// No playable cell is occupied after the clear
    pub perfect_clear: bool,
}

/// Outcome of a scoring clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub kind: ClearKind,
    pub lines: u8,
    pub points: u64,
    /// Combo count this clear was scored with (0 for the first clear in a chain)
    pub combo: u32,
    /// Whether the back-to-back multiplier applied
    pub back_to_back: bool,
    pub perfect_clear: bool,
    pub levels_gained: u32,
}

impl ClearReport {
    /// Build action string for display
    pub fn label(&self) -> String {
        let mut action = String::from(self.kind.name());
        if self.back_to_back {
            action = format!("B2B {action}");
        }
        if self.combo > 0 {
            action.push_str(&format!(" Combo x{}", self.combo));
        }
        if self.perfect_clear {
            action.push_str(" PERFECT!");
        }
        action
    }
}

/// Scoring state for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreState {
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// `lines / 10`
    pub level: u32,
    /// Consecutive line-clearing locks so far
    pub combo: u32,
    /// Whether the last clear was a Tetris or T-spin
    pub back_to_back: bool,
    pub tetrises: u32,
    pub t_spins: u32,
    pub perfect_clears: u32,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a locked piece. Returns `None` when no line was cleared.
    pub fn apply_lock(&mut self, event: LockEvent) -> Option<ClearReport> {
        let Some(kind) = ClearKind::classify(event.lines, event.t_spin) else {
            self.combo = 0;
            // only a T-spin keeps the chain alive without clearing
            if !event.t_spin {
                self.back_to_back = false;
            }
            return None;
        };

        // base × (1 + combo / 2) × 1.5 on back-to-back, floored
        let combo = self.combo;
        let back_to_back = kind.is_difficult() && self.back_to_back;
        let scaled = kind.base_score() * (2 + combo as u64);
        let mut points = if back_to_back { scaled * 3 / 4 } else { scaled / 2 };
        if event.perfect_clear {
            points += PERFECT_CLEAR_BONUS;
            self.perfect_clears += 1;
        }

        self.points += points;
        self.combo += 1;
        self.back_to_back = kind.is_difficult();
        if kind == ClearKind::Tetris {
            self.tetrises += 1;
        }
        if kind.is_t_spin() {
            self.t_spins += 1;
        }

        self.lines += event.lines as u32;
        let level = self.lines / LINES_PER_LEVEL;
        let levels_gained = level - self.level;
        self.level = level;

        Some(ClearReport {
            kind,
            lines: event.lines,
            points,
            combo,
            back_to_back,
            perfect_clear: event.perfect_clear,
            levels_gained,
        })
    }

    /// Add score for soft drop (1 point per row)
    pub fn add_soft_drop(&mut self, rows: u32) {
        self.points += rows as u64;
    }

    /// Add score for hard drop (2 points per row)
    pub fn add_hard_drop(&mut self, rows: u32) {
        self.points += rows as u64 * 2;
    }
}

/// A T piece whose last move was a rotation, with at least three of the four
/// cells diagonal to its pivot occupied (walls and off-board count)
pub fn detect_t_spin(piece: &Piece, board: &Board) -> bool {
    if !piece.is_t_piece() || !piece.rotated_last {
        return false;
    }
    let Some((px, py)) = piece.pivot() else {
        return false;
    };

    let filled_corners = [(-1, -1), (1, -1), (-1, 1), (1, 1)]
        .iter()
        .filter(|(dx, dy)| board.is_occupied(px + dx, py + dy))
        .count();
    filled_corners >= 3
}
