//! Active falling piece logic

use crate::board::Board;
use crate::kicks::wall_kicks;
use crate::tetromino::{mask_cells, Mask, Rotation, TetrominoType, T_PIVOT};
use serde::Serialize;

/// Spawn offset of the mask's top-left corner
pub const SPAWN_X: i32 = 4;
pub const SPAWN_Y: i32 = 0;

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current rotation state
    pub rotation: Rotation,
    /// Board column of the mask's left edge
    pub x: i32,
    /// Board row of the mask's top edge (row 0 is the top)
    pub y: i32,
    /// Whether the last successful action was a rotation (for T-spin detection)
    pub rotated_last: bool,
}

impl Piece {
    /// Create a new piece in its spawn orientation at the spawn offset.
    /// Whether it actually fits is up to the caller to check.
    pub fn spawn(piece_type: TetrominoType) -> Self {
        Self {
            piece_type,
            rotation: Rotation::North,
            x: SPAWN_X,
            y: SPAWN_Y,
            rotated_last: false,
        }
    }

    /// Occupancy mask for the current orientation
    pub fn mask(&self) -> &'static Mask {
        self.piece_type.shape(self.rotation)
    }

    /// Get the absolute (x, y) positions of all 4 blocks
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        mask_cells(self.mask()).map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Board position of the rotation pivot, only defined for T
    pub fn pivot(&self) -> Option<(i32, i32)> {
        let (row, col) = T_PIVOT;
        matches!(self.piece_type, TetrominoType::T).then_some((self.x + col, self.y + row))
    }

    /// Try to shift by (dx, dy), returns true if successful
    pub fn shift(&mut self, dx: i32, dy: i32, board: &Board) -> bool {
        if !board.can_place(self, dx, dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        self.rotated_last = false;
        true
    }

    pub fn move_left(&mut self, board: &Board) -> bool {
        self.shift(-1, 0, board)
    }

    pub fn move_right(&mut self, board: &Board) -> bool {
        self.shift(1, 0, board)
    }

    pub fn move_down(&mut self, board: &Board) -> bool {
        self.shift(0, 1, board)
    }

    /// Try to rotate 90° clockwise, nudging sideways if the spot is taken.
    /// On failure the piece is left exactly as it was.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let new_rotation = self.rotation.cw();
        let mask = self.piece_type.shape(new_rotation);

        for &kick in wall_kicks(self.piece_type) {
            if board.fits(mask, self.x + kick, self.y) {
                self.rotation = new_rotation;
                self.x += kick;
                self.rotated_last = true;
                return true;
            }
        }
        false
    }

    /// Move straight down as far as possible and return the distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let landing = board.ghost_row(self);
        let distance = landing - self.y;
        if distance > 0 {
            self.y = landing;
            self.rotated_last = false;
        }
        distance
    }

    /// Check if this is a T piece (for T-spin detection)
    pub fn is_t_piece(&self) -> bool {
        matches!(self.piece_type, TetrominoType::T)
    }
}
