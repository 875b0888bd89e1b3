//! TETRS engine - falling-block gameplay core
//!
//! Board, pieces, randomizer, gravity and lock delay, DAS/ARR, scoring and
//! the [`Session`] that ties them together. Rendering, audio and input
//! devices belong to the host; it feeds [`Intent`]s in and reads
//! [`Snapshot`]s out.

pub mod autoplay;
pub mod bag;
pub mod board;
pub mod config;
pub mod gravity;
pub mod input;
pub mod kicks;
pub mod piece;
pub mod score;
pub mod session;
pub mod settings;
pub mod tetromino;

pub use board::{Board, Cell};
pub use config::{Difficulty, SessionConfig};
pub use input::{Direction, Intent};
pub use piece::Piece;
pub use score::{ClearKind, ClearReport, ScoreState};
pub use session::{Session, SessionState, Snapshot, Statistics};
pub use settings::Settings;
pub use tetromino::{Rotation, TetrominoType};
