//! Game board representation and collision detection

use crate::piece::Piece;
use crate::tetromino::{mask_cells, Mask, Rgb, TetrominoType, WALL_COLOR};
use serde::Serialize;

/// Board dimensions, border included
pub const BOARD_WIDTH: usize = 12;
pub const BOARD_HEIGHT: usize = 22;
/// The permanent bottom border row
pub const FLOOR_ROW: usize = BOARD_HEIGHT - 1;
/// Rows `FIRST_ROW..FLOOR_ROW` form the field; row 0 above them is the spawn buffer
pub const FIRST_ROW: usize = 1;
/// Playable columns are `FIRST_COL..=LAST_COL`
pub const FIRST_COL: usize = 1;
pub const LAST_COL: usize = BOARD_WIDTH - 2;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Border cell, never changes after the board is built
    Wall,
    Block(TetrominoType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        !self.is_empty()
    }

    pub fn color(&self) -> Option<Rgb> {
        match self {
            Cell::Empty => None,
            Cell::Wall => Some(WALL_COLOR),
            Cell::Block(kind) => Some(kind.color()),
        }
    }
}

/// Result of a line clear pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineClear {
    pub count: usize,
    /// Pre-clear indices of the removed rows, bottom first
    pub rows: Vec<usize>,
}

type Row = [Cell; BOARD_WIDTH];

const EMPTY_ROW: Row = {
    let mut row = [Cell::Empty; BOARD_WIDTH];
    row[0] = Cell::Wall;
    row[BOARD_WIDTH - 1] = Cell::Wall;
    row
};

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top (spawn) row
    cells: [Row; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board surrounded by walls on the left, right and bottom
    pub fn new() -> Self {
        let mut cells = [EMPTY_ROW; BOARD_HEIGHT];
        cells[FLOOR_ROW] = [Cell::Wall; BOARD_WIDTH];
        Self { cells }
    }

    /// Build a board from a picture of its lowest playable rows.
    ///
    /// Each string describes one row of the 10 playable columns, top to
    /// bottom; the last string lands just above the floor. Piece letters
    /// become blocks of that type, anything else is left empty.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let mut board = Self::new();
        let top = FLOOR_ROW.saturating_sub(rows.len());
        for (offset, line) in rows.iter().enumerate() {
            let y = (top + offset) as i32;
            for (i, c) in line.chars().take(LAST_COL).enumerate() {
                if let Some(kind) = TetrominoType::from_letter(c) {
                    board.set(FIRST_COL as i32 + i as i32, y, Cell::Block(kind));
                }
            }
        }
        board
    }

    /// Get the cell at (x, y), None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Set an interior cell. Border cells and walls are refused.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !Self::is_interior(x, y) || cell == Cell::Wall {
            return false;
        }
        self.cells[y as usize][x as usize] = cell;
        true
    }

    /// Whether (x, y) is inside the playable field
    pub fn is_interior(x: i32, y: i32) -> bool {
        (FIRST_COL as i32..=LAST_COL as i32).contains(&x) && (0..FLOOR_ROW as i32).contains(&y)
    }

    /// Blocks, walls and anything off the board count as occupied
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none_or(|cell| cell.is_filled())
    }

    /// Whether `mask` fits with its top-left corner at (x, y)
    pub fn fits(&self, mask: &Mask, x: i32, y: i32) -> bool {
        mask_cells(mask).all(|(dx, dy)| {
            let (tx, ty) = (x + dx, y + dy);
            Self::is_interior(tx, ty) && self.cells[ty as usize][tx as usize].is_empty()
        })
    }

    /// Whether `piece` would fit after shifting it by (dx, dy)
    pub fn can_place(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        self.fits(piece.mask(), piece.x + dx, piece.y + dy)
    }

    /// Write a piece into the grid. The position must already be known to fit.
    pub fn commit(&mut self, piece: &Piece) {
        debug_assert!(
            self.can_place(piece, 0, 0),
            "committing {:?} at ({}, {}) which does not fit",
            piece.piece_type,
            piece.x,
            piece.y
        );
        for (x, y) in piece.cells() {
            self.cells[y as usize][x as usize] = Cell::Block(piece.piece_type);
        }
    }

    /// Remove every full field row, letting the rows above (spawn buffer
    /// included) fall into place. A full buffer row is never cleared.
    pub fn clear_completed_rows(&mut self) -> LineClear {
        let mut cleared = LineClear::default();
        let mut write_row = FLOOR_ROW;

        for read_row in (0..FLOOR_ROW).rev() {
            if read_row >= FIRST_ROW && self.is_line_full(read_row) {
                cleared.rows.push(read_row);
            } else {
                write_row -= 1;
                if write_row != read_row {
                    self.cells[write_row] = self.cells[read_row];
                }
            }
        }

        // Fill the top with empty rows
        for row in &mut self.cells[..write_row] {
            *row = EMPTY_ROW;
        }

        cleared.count = cleared.rows.len();
        cleared
    }

    /// Lowest row `piece` could occupy if it dropped straight down
    pub fn ghost_row(&self, piece: &Piece) -> i32 {
        let mut dy = 0;
        while self.can_place(piece, 0, dy + 1) {
            dy += 1;
        }
        piece.y + dy
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row][FIRST_COL..=LAST_COL]
            .iter()
            .all(|cell| cell.is_filled())
    }

    /// Whether no field cell is occupied (for perfect-clear detection).
    /// The spawn buffer row is not checked.
    pub fn is_clear(&self) -> bool {
        self.cells[FIRST_ROW..FLOOR_ROW]
            .iter()
            .all(|row| row[FIRST_COL..=LAST_COL].iter().all(|cell| cell.is_empty()))
    }

    /// Rows top to bottom, border included
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }
}
