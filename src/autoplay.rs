//! Greedy placement bot for the headless demo
//!
//! Tries every rotation and column for the current piece, scores the board
//! each placement leaves behind, and returns the intents that reach the best
//! one. Plans are replayed inside a single `advance` call, so gravity never
//! gets a chance to interfere.

use crate::board::{Board, FIRST_COL, FLOOR_ROW, LAST_COL};
use crate::input::{Direction, Intent};
use crate::piece::Piece;
use std::cmp::Reverse;

/// A reachable placement and how to get there
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    rotations: u32,
    shift: i32,
    score: i32,
}

impl Placement {
    fn cost(&self) -> u32 {
        self.rotations + self.shift.unsigned_abs()
    }
}

/// Intents that place `piece` where the resulting board scores best
pub fn plan(board: &Board, piece: &Piece) -> Vec<Intent> {
    // ties go to the placement needing the fewest inputs
    let best = candidates(board, piece)
        .max_by_key(|placement| (placement.score, Reverse(placement.cost())));

    let mut intents = Vec::new();
    if let Some(placement) = best {
        intents.extend((0..placement.rotations).map(|_| Intent::Rotate));
        let direction = if placement.shift < 0 { Direction::Left } else { Direction::Right };
        for _ in 0..placement.shift.unsigned_abs() {
            intents.push(Intent::Press(direction));
            intents.push(Intent::Release(direction));
        }
    }
    intents.push(Intent::HardDrop);
    intents
}

fn candidates<'a>(board: &'a Board, piece: &'a Piece) -> impl Iterator<Item = Placement> + 'a {
    let turns = if piece.piece_type.rotates() { 4 } else { 1 };
    let width = (LAST_COL - FIRST_COL) as i32;

    (0..turns).flat_map(move |rotations| {
        (-width..=width).filter_map(move |shift| simulate(board, piece, rotations, shift))
    })
}

/// Replay rotations then shifts the way the session would, and score the
/// board after the hard drop. `None` if the shift is not fully reachable.
fn simulate(board: &Board, piece: &Piece, rotations: u32, shift: i32) -> Option<Placement> {
    let mut moved = piece.clone();
    for _ in 0..rotations {
        if !moved.rotate(board) {
            return None;
        }
    }
    for _ in 0..shift.unsigned_abs() {
        let ok = if shift < 0 { moved.move_left(board) } else { moved.move_right(board) };
        if !ok {
            return None;
        }
    }
    moved.hard_drop(board);

    let mut after = board.clone();
    after.commit(&moved);
    let lines = after.clear_completed_rows().count as i32;
    let score = lines * 40 - holes(&after) * 8 - stack_height(&after) * 2;

    Some(Placement {
        rotations,
        shift,
        score,
    })
}

/// Empty cells with a filled cell somewhere above them
fn holes(board: &Board) -> i32 {
    let mut holes = 0;
    for x in FIRST_COL as i32..=LAST_COL as i32 {
        let mut covered = false;
        for y in 0..FLOOR_ROW as i32 {
            if board.is_occupied(x, y) {
                covered = true;
            } else if covered {
                holes += 1;
            }
        }
    }
    holes
}

/// Rows from the floor up to the highest filled cell
fn stack_height(board: &Board) -> i32 {
    (0..FLOOR_ROW as i32)
        .find(|&y| (FIRST_COL as i32..=LAST_COL as i32).any(|x| board.is_occupied(x, y)))
        .map_or(0, |top| FLOOR_ROW as i32 - top)
}
