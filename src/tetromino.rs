//! Tetromino definitions and shapes
//!
//! All 7 tetrominoes as 4x4 occupancy masks, one per rotation state.
//! Every piece except T derives its states by rotating the spawn mask
//! clockwise (row i, col j → row j, col 3 - i). T uses an explicit table so
//! its pivot cell stays put across all four states.

use serde::Serialize;

/// A 4x4 occupancy grid indexed as `[row][col]`, row 0 at the top
pub type Mask = [[bool; 4]; 4];

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Color used for the immovable border cells
pub const WALL_COLOR: Rgb = Rgb(60, 60, 80);

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Rgb {
        match self {
            TetrominoType::I => Rgb(0, 240, 240),
            TetrominoType::O => Rgb(240, 240, 0),
            TetrominoType::T => Rgb(160, 0, 240),
            TetrominoType::S => Rgb(0, 240, 0),
            TetrominoType::Z => Rgb(240, 0, 0),
            TetrominoType::J => Rgb(0, 0, 240),
            TetrominoType::L => Rgb(240, 160, 0),
        }
    }

    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Position in [`TetrominoType::all`], used to index per-piece tables
    pub fn index(&self) -> usize {
        match self {
            TetrominoType::I => 0,
            TetrominoType::O => 1,
            TetrominoType::T => 2,
            TetrominoType::S => 3,
            TetrominoType::Z => 4,
            TetrominoType::J => 5,
            TetrominoType::L => 6,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            TetrominoType::I => 'I',
            TetrominoType::O => 'O',
            TetrominoType::T => 'T',
            TetrominoType::S => 'S',
            TetrominoType::Z => 'Z',
            TetrominoType::J => 'J',
            TetrominoType::L => 'L',
        }
    }

    pub fn from_letter(c: char) -> Option<TetrominoType> {
        TetrominoType::all()
            .into_iter()
            .find(|kind| kind.letter() == c.to_ascii_uppercase())
    }

    /// The O piece never changes orientation
    pub fn rotates(&self) -> bool {
        !matches!(self, TetrominoType::O)
    }

    /// Occupancy mask for this tetromino at a given rotation
    pub fn shape(&self, rotation: Rotation) -> &'static Mask {
        &SHAPES[self.index()][rotation.index()]
    }
}

/// Rotation states (SRS naming; North is the spawn state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// Mask cell (row, col) holding the T piece's pivot in every rotation state
pub const T_PIVOT: (i32, i32) = (2, 1);

/// Occupied cells of a mask as (dx, dy) offsets from its top-left corner
pub fn mask_cells(mask: &Mask) -> impl Iterator<Item = (i32, i32)> + '_ {
    mask.iter().enumerate().flat_map(|(row, cols)| {
        cols.iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(move |(col, _)| (col as i32, row as i32))
    })
}

const fn mask_from(cells: [(usize, usize); 4]) -> Mask {
    let mut mask = [[false; 4]; 4];
    let mut n = 0;
    while n < 4 {
        mask[cells[n].0][cells[n].1] = true;
        n += 1;
    }
    mask
}

const fn rotate_cw(mask: Mask) -> Mask {
    let mut out = [[false; 4]; 4];
    let mut i = 0;
    while i < 4 {
        let mut j = 0;
        while j < 4 {
            out[j][3 - i] = mask[i][j];
            j += 1;
        }
        i += 1;
    }
    out
}

const fn derive_states(spawn: Mask) -> [Mask; 4] {
    let east = rotate_cw(spawn);
    let south = rotate_cw(east);
    let west = rotate_cw(south);
    [spawn, east, south, west]
}

const I_SPAWN: Mask = mask_from([(0, 1), (1, 1), (2, 1), (3, 1)]);
const O_SPAWN: Mask = mask_from([(1, 1), (1, 2), (2, 1), (2, 2)]);
const S_SPAWN: Mask = mask_from([(1, 1), (1, 2), (2, 0), (2, 1)]);
const Z_SPAWN: Mask = mask_from([(1, 0), (1, 1), (2, 1), (2, 2)]);
const J_SPAWN: Mask = mask_from([(1, 0), (2, 0), (2, 1), (2, 2)]);
const L_SPAWN: Mask = mask_from([(1, 2), (2, 0), (2, 1), (2, 2)]);

// T states all share the pivot at T_PIVOT
// North: .T..   East: .T..   South: ....   West: .T..
//        TTT.         .TT.          TTT.         TT..
//        ....         .T..          .T..         .T..
const T_STATES: [Mask; 4] = [
    mask_from([(1, 1), (2, 0), (2, 1), (2, 2)]),
    mask_from([(1, 1), (2, 1), (2, 2), (3, 1)]),
    mask_from([(2, 0), (2, 1), (2, 2), (3, 1)]),
    mask_from([(1, 1), (2, 0), (2, 1), (3, 1)]),
];

static SHAPES: [[Mask; 4]; 7] = [
    derive_states(I_SPAWN),
    [O_SPAWN; 4],
    T_STATES,
    derive_states(S_SPAWN),
    derive_states(Z_SPAWN),
    derive_states(J_SPAWN),
    derive_states(L_SPAWN),
];
