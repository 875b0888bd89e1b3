//! Wall kick data
//!
//! Instead of per-orientation SRS tables, every rotation tries the same
//! horizontal nudges in order and keeps the first that fits.

use crate::tetromino::TetrominoType;

/// Column offsets tried, in order, when a rotation would collide
pub const KICKS: [i32; 5] = [0, -1, 1, -2, 2];

/// Get wall kick offsets for a rotation attempt of `piece_type`
pub fn wall_kicks(piece_type: TetrominoType) -> &'static [i32] {
    if piece_type.rotates() { &KICKS } else { &[] }
}
