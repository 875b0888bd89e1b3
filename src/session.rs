//! Core game state and logic
//!
//! A [`Session`] is one game attempt. The host calls [`Session::advance`]
//! once per frame with the elapsed time and the intents gathered since the
//! last call, and renders the [`Snapshot`] it returns.

use crate::bag::Bag;
use crate::board::{Board, BOARD_HEIGHT};
use crate::config::SessionConfig;
use crate::gravity::{LockController, Step};
use crate::input::{Direction, Intent, RepeatController};
use crate::piece::Piece;
use crate::score::{detect_t_spin, ClearReport, LockEvent, ScoreState};
use crate::tetromino::TetrominoType;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// Running totals that do not affect play
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub pieces_placed: u32,
    /// Locked pieces per type, in [`TetrominoType::all`] order
    pub piece_counts: [u32; 7],
    /// Seconds spent playing, pauses excluded
    pub play_time: f32,
}

/// Everything a renderer needs, copied out at the end of a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub current: Piece,
    /// Row the current piece would land on if hard-dropped now
    pub ghost_row: i32,
    pub next: TetrominoType,
    /// Pieces after `next`
    pub preview: Vec<TetrominoType>,
    pub hold: Option<TetrominoType>,
    pub hold_available: bool,
    pub score: ScoreState,
    /// Most recent lock's clear, `None` if it cleared nothing
    pub last_clear: Option<ClearReport>,
    /// Pre-clear indices of rows removed during this tick
    pub cleared_rows: Vec<usize>,
    pub stats: Statistics,
    pub gravity_interval: f32,
    pub state: SessionState,
    pub game_over: bool,
}

/// One game attempt
pub struct Session {
    config: SessionConfig,
    board: Board,
    current: Piece,
    /// `next` followed by the preview window
    upcoming: VecDeque<TetrominoType>,
    bag: Bag,
    hold_piece: Option<TetrominoType>,
    /// Whether hold may be used by the current piece
    hold_available: bool,
    score: ScoreState,
    lock: LockController,
    input: RepeatController,
    state: SessionState,
    stats: Statistics,
    last_clear: Option<ClearReport>,
    cleared_rows: Vec<usize>,
}

impl Session {
    /// Create a new session with an entropy-seeded randomizer
    pub fn new(config: SessionConfig) -> Self {
        Self::with_bag(config, Bag::new())
    }

    /// Create a new session whose piece sequence is fixed by `seed`
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self::with_bag(config, Bag::with_seed(seed))
    }

    fn with_bag(config: SessionConfig, mut bag: Bag) -> Self {
        let first = bag.next();
        let upcoming = (0..=config.preview_len).map(|_| bag.next()).collect();
        info!(
            "New session: difficulty={}, gravity={}s",
            config.difficulty.name(),
            config.difficulty.gravity_interval()
        );

        Self {
            board: Board::new(),
            current: Piece::spawn(first),
            upcoming,
            bag,
            hold_piece: None,
            hold_available: true,
            score: ScoreState::new(),
            lock: LockController::new(&config),
            input: RepeatController::new(&config),
            state: SessionState::Playing,
            stats: Statistics::default(),
            last_clear: None,
            cleared_rows: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn hold_piece(&self) -> Option<TetrominoType> {
        self.hold_piece
    }

    pub fn hold_available(&self) -> bool {
        self.hold_available
    }

    /// The piece that spawns after the current one locks
    pub fn next(&self) -> TetrominoType {
        self.upcoming[0]
    }

    /// Upcoming pieces after [`Session::next`]
    pub fn preview(&self) -> impl Iterator<Item = TetrominoType> + '_ {
        self.upcoming.iter().skip(1).copied()
    }

    /// Run one tick: discrete intents, then held-key repeats, then gravity
    /// and lock delay.
    pub fn advance(&mut self, dt: f32, intents: &[Intent]) -> Snapshot {
        if self.state == SessionState::GameOver {
            return self.snapshot();
        }
        let dt = if dt.is_nan() { 0.0 } else { dt.clamp(0.0, self.config.max_dt) };
        self.cleared_rows.clear();

        for &intent in intents {
            self.process_intent(intent);
        }

        if self.state == SessionState::Playing {
            self.stats.play_time += dt;
            self.apply_repeats(dt);
        }
        if self.state == SessionState::Playing {
            self.apply_gravity(dt);
        }

        self.snapshot()
    }

    /// Process an intent
    pub fn process_intent(&mut self, intent: Intent) {
        match self.state {
            SessionState::GameOver => {
                // No actions until the host starts a new session
            }
            SessionState::Paused => {
                if intent == Intent::PauseToggle {
                    debug!("Resumed");
                    self.state = SessionState::Playing;
                }
            }
            SessionState::Playing => match intent {
                Intent::Press(direction) => {
                    if self.input.press(direction) {
                        self.step(direction);
                    }
                }
                Intent::Release(direction) => self.input.release(direction),
                Intent::HardDrop => self.hard_drop(),
                Intent::Rotate => {
                    if self.current.rotate(&self.board) {
                        self.lock.on_manipulation();
                    }
                }
                Intent::Hold => {
                    self.hold();
                }
                Intent::PauseToggle => {
                    debug!("Paused");
                    self.state = SessionState::Paused;
                    self.input.clear();
                }
            },
        }
    }

    /// Swap the current piece with the held one, or stash it and take the
    /// next piece if nothing is held. Allowed once per piece.
    pub fn hold(&mut self) -> bool {
        if self.state != SessionState::Playing || !self.hold_available {
            return false;
        }

        let current = self.current.piece_type;
        let incoming = match self.hold_piece.replace(current) {
            Some(held) => held,
            None => self.pull_next(),
        };
        debug!("Hold {:?}, playing {:?}", current, incoming);

        self.hold_available = false;
        self.spawn(incoming);
        true
    }

    /// Take one step in `direction`, returns true if the piece moved
    fn step(&mut self, direction: Direction) -> bool {
        let moved = match direction {
            Direction::Left => self.current.move_left(&self.board),
            Direction::Right => self.current.move_right(&self.board),
            Direction::Down => return self.soft_drop_step(),
        };
        if moved {
            self.lock.on_manipulation();
        }
        moved
    }

    fn soft_drop_step(&mut self) -> bool {
        if !self.current.move_down(&self.board) {
            return false;
        }
        self.score.add_soft_drop(1);
        self.lock.restart_fall();
        true
    }

    fn apply_repeats(&mut self, dt: f32) {
        let repeats = self.input.update(dt);
        for (direction, count) in [
            (Direction::Left, repeats.left),
            (Direction::Right, repeats.right),
            (Direction::Down, repeats.down),
        ] {
            // no path across the board is longer than its height
            for _ in 0..count.min(BOARD_HEIGHT as u32) {
                if !self.step(direction) {
                    break;
                }
            }
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        let can_fall = self.board.can_place(&self.current, 0, 1);
        match self.lock.tick(dt, can_fall) {
            Step::Wait => {}
            Step::Fall => {
                self.current.move_down(&self.board);
            }
            Step::Lock => self.lock_piece(),
        }
    }

    fn hard_drop(&mut self) {
        let distance = self.current.hard_drop(&self.board);
        self.score.add_hard_drop(distance as u32);
        self.lock_piece();
    }

    /// Lock the current piece, score the result and spawn the next one
    fn lock_piece(&mut self) {
        let piece = self.current.clone();
        let t_spin = detect_t_spin(&piece, &self.board);
        self.board.commit(&piece);

        let cleared = self.board.clear_completed_rows();
        let event = LockEvent {
            lines: cleared.count as u8,
            t_spin,
            perfect_clear: cleared.count > 0 && self.board.is_clear(),
        };
        let report = self.score.apply_lock(event);

        if let Some(report) = &report {
            debug!(
                "{} for {} points (score {})",
                report.label(),
                report.points,
                self.score.points
            );
            if report.levels_gained > 0 {
                self.lock.speed_up(report.levels_gained);
                info!(
                    "Level {} reached, gravity now {:.2}s per row",
                    self.score.level,
                    self.lock.interval()
                );
            }
        }

        self.stats.pieces_placed += 1;
        self.stats.piece_counts[piece.piece_type.index()] += 1;
        self.last_clear = report;
        self.cleared_rows = cleared.rows;
        self.hold_available = true;

        let next = self.pull_next();
        self.spawn(next);
    }

    /// Take the front of the queue and top the queue back up from the bag
    fn pull_next(&mut self) -> TetrominoType {
        self.upcoming.push_back(self.bag.next());
        self.upcoming
            .pop_front()
            .unwrap_or_else(|| self.bag.next())
    }

    /// Put a fresh piece at the spawn point, ending the game if it does not fit
    fn spawn(&mut self, piece_type: TetrominoType) {
        self.current = Piece::spawn(piece_type);
        self.lock.reset();
        debug!("Spawned {:?}", piece_type);

        if !self.board.can_place(&self.current, 0, 0) {
            info!(
                "Game over: {:?} cannot spawn, final score {}",
                piece_type, self.score.points
            );
            self.state = SessionState::GameOver;
            self.input.clear();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            current: self.current.clone(),
            ghost_row: self.board.ghost_row(&self.current),
            next: self.next(),
            preview: self.preview().collect(),
            hold: self.hold_piece,
            hold_available: self.hold_available,
            score: self.score.clone(),
            last_clear: self.last_clear.clone(),
            cleared_rows: self.cleared_rows.clone(),
            stats: self.stats.clone(),
            gravity_interval: self.lock.interval(),
            state: self.state,
            game_over: self.is_game_over(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, FLOOR_ROW};
    use crate::config::Difficulty;
    use crate::score::ClearKind;
    use crate::tetromino::Rotation;

    fn session() -> Session {
        Session::with_seed(SessionConfig::default(), 1234)
    }

    /// Session with a prepared board and a chosen current piece
    fn session_with(board: Board, piece_type: TetrominoType) -> Session {
        let mut session = session();
        session.board = board;
        session.current = Piece::spawn(piece_type);
        session
    }

    #[test]
    fn test_new_session() {
        let session = session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Playing);
        assert!(!snapshot.game_over);
        assert_eq!(snapshot.preview.len(), 4);
        assert_eq!(snapshot.hold, None);
        assert!(snapshot.hold_available);
        assert_eq!((snapshot.current.x, snapshot.current.y), (4, 0));
        assert_eq!(snapshot.gravity_interval, 0.8);
    }

    #[test]
    fn test_first_pieces_come_from_one_bag() {
        let session = session();
        let mut seen = vec![session.current().piece_type, session.next()];
        seen.extend(session.preview());
        seen.sort_by_key(|kind| kind.index());
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = session();
        let mut b = session();
        for _ in 0..20 {
            a.advance(0.016, &[Intent::HardDrop]);
            b.advance(0.016, &[Intent::HardDrop]);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_gravity_moves_piece_down() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        session.advance(0.5, &[]);
        assert_eq!(session.current().y, 0);
        session.advance(0.31, &[]);
        assert_eq!(session.current().y, 1);
    }

    #[test]
    fn test_dt_is_capped() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        // one huge frame counts as max_dt, short of the 0.8s interval
        session.advance(100.0, &[]);
        assert_eq!(session.current().y, 0);
        assert_eq!(session.stats().play_time, 0.25);
    }

    #[test]
    fn test_das_slides_to_wall() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        session.advance(0.0, &[Intent::MOVE_RIGHT]);
        assert_eq!(session.current().x, 5);
        session.advance(0.1, &[]);
        assert_eq!(session.current().x, 5);
        // DAS charged, ARR 0 carries the piece to the wall
        session.advance(0.05, &[]);
        assert_eq!(session.current().x, 8);

        session.advance(0.0, &[Intent::Release(Direction::Right), Intent::MOVE_LEFT]);
        assert_eq!(session.current().x, 7);
        session.advance(0.2, &[]);
        assert_eq!(session.current().x, 0);
    }

    #[test]
    fn test_soft_drop_scores_per_row() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        session.advance(0.0, &[Intent::SOFT_DROP]);
        assert_eq!(session.current().y, 1);
        session.advance(0.1, &[]);
        session.advance(0.1, &[]);
        assert_eq!(session.current().y, 5);
        assert_eq!(session.score().points, 5);

        session.advance(0.0, &[Intent::Release(Direction::Down)]);
        session.advance(0.2, &[]);
        assert_eq!(session.current().y, 5);
    }

    #[test]
    fn test_piece_locks_after_delay() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        session.current.y = FLOOR_ROW as i32 - 3;
        session.advance(0.0, &[]); // grounded
        session.advance(0.3, &[]);
        assert_eq!(session.stats().pieces_placed, 0);
        session.advance(0.25, &[]);
        assert_eq!(session.stats().pieces_placed, 1);
        assert_eq!(session.board().get(5, FLOOR_ROW as i32 - 1), Some(Cell::Block(TetrominoType::O)));
        assert_eq!(session.current().y, 0);
    }

    #[test]
    fn test_moves_restart_lock_delay() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        session.current.y = FLOOR_ROW as i32 - 3;
        session.advance(0.0, &[]);
        session.advance(0.2, &[]);
        session.advance(0.2, &[Intent::MOVE_LEFT]);
        session.advance(0.2, &[Intent::Release(Direction::Left)]);
        session.advance(0.2, &[]);
        // 0.8s on the ground, but the move restarted the clock at 0.4s
        assert_eq!(session.stats().pieces_placed, 0);
        session.advance(0.2, &[]);
        assert_eq!(session.stats().pieces_placed, 1);
    }

    #[test]
    fn test_lock_reset_cap() {
        let mut session = session_with(Board::new(), TetrominoType::O);
        session.current.y = FLOOR_ROW as i32 - 3;
        session.advance(0.0, &[]);
        for i in 0..15 {
            assert_eq!(session.stats().pieces_placed, 0, "locked early at move {i}");
            let intent = if i % 2 == 0 { Intent::MOVE_LEFT } else { Intent::MOVE_RIGHT };
            session.advance(0.01, &[intent]);
        }
        assert_eq!(session.stats().pieces_placed, 1);
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut session = session();
        let first = session.current().piece_type;
        let next = session.next();

        assert!(session.hold());
        assert_eq!(session.hold_piece(), Some(first));
        assert_eq!(session.current().piece_type, next);
        assert!(!session.hold_available());

        let before = session.snapshot();
        assert!(!session.hold());
        session.advance(0.0, &[Intent::Hold]);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_hold_swaps_back_after_lock() {
        let mut session = session();
        let first = session.current().piece_type;
        session.hold();
        session.advance(0.0, &[Intent::HardDrop]);
        assert!(session.hold_available());

        let playing = session.current().piece_type;
        session.advance(0.0, &[Intent::Hold]);
        assert_eq!(session.current().piece_type, first);
        assert_eq!(session.hold_piece(), Some(playing));
        assert_eq!((session.current().x, session.current().y), (4, 0));
    }

    #[test]
    fn test_tetris_clear() {
        let mut rows = vec!["Z.........".to_string()];
        rows.extend((0..4).map(|_| "LLLL.LLLLL".to_string()));
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let mut session = session_with(Board::from_ascii(&rows), TetrominoType::I);

        let snapshot = session.advance(0.0, &[Intent::HardDrop]);
        let report = snapshot.last_clear.expect("four lines cleared");
        assert_eq!(report.kind, ClearKind::Tetris);
        assert_eq!(report.points, 800);
        assert_eq!(snapshot.cleared_rows, vec![20, 19, 18, 17]);
        // 17 rows of hard drop at 2 points each
        assert_eq!(snapshot.score.points, 800 + 34);
        assert!(snapshot.score.back_to_back);
        assert_eq!(snapshot.score.lines, 4);
        assert_eq!(snapshot.board.get(1, FLOOR_ROW as i32 - 1), Some(Cell::Block(TetrominoType::Z)));
        assert_eq!(snapshot.stats.piece_counts[TetrominoType::I.index()], 1);
    }

    #[test]
    fn test_t_spin_single() {
        // slot at column 5 with an overhang at (4, 18)
        let board = Board::from_ascii(&["...Z......", "..........", "ZZZZ.ZZZZZ"]);
        let mut session = session_with(board, TetrominoType::T);
        session.current = Piece {
            rotation: Rotation::West,
            x: 4,
            y: FLOOR_ROW as i32 - 4,
            ..Piece::spawn(TetrominoType::T)
        };

        // turn to point down into the slot, then lock where it stands
        let snapshot = session.advance(0.0, &[Intent::Rotate, Intent::HardDrop]);
        let report = snapshot.last_clear.expect("one line cleared");
        assert_eq!(report.kind, ClearKind::TSpinSingle);
        assert_eq!(report.points, 800);
        assert_eq!(snapshot.score.points, 800);
        assert_eq!(snapshot.score.t_spins, 1);
        assert!(snapshot.score.back_to_back);
        assert_eq!(snapshot.cleared_rows, vec![FLOOR_ROW - 1]);
    }

    #[test]
    fn test_perfect_clear() {
        let board = Board::from_ascii(&["ZZZ....ZZZ"]);
        let mut session = session_with(board, TetrominoType::I);

        let snapshot = session.advance(0.0, &[Intent::Rotate, Intent::HardDrop]);
        let report = snapshot.last_clear.expect("one line cleared");
        assert!(report.perfect_clear);
        assert_eq!(report.points, 100 + 3000);
        assert!(snapshot.board.is_clear());
        // 19 rows of hard drop on top
        assert_eq!(snapshot.score.points, 3100 + 38);
        assert_eq!(snapshot.score.perfect_clears, 1);
    }

    #[test]
    fn test_level_up_speeds_gravity() {
        let mut session = session();
        session.score.lines = 9;
        session.board = Board::from_ascii(&["ZZZ....ZZZ"]);
        session.current = Piece::spawn(TetrominoType::I);
        let snapshot = session.advance(0.0, &[Intent::Rotate, Intent::HardDrop]);
        assert_eq!(snapshot.score.level, 1);
        assert!((snapshot.gravity_interval - 0.72).abs() < 1e-6);
    }

    #[test]
    fn test_game_over() {
        let rows = vec!["ZZZZZZZZZ."; 18];
        let mut session = session_with(Board::from_ascii(&rows), TetrominoType::O);

        let snapshot = session.advance(0.0, &[Intent::HardDrop]);
        assert!(snapshot.game_over);
        assert_eq!(snapshot.state, SessionState::GameOver);

        let frozen = session.snapshot();
        let after = session.advance(
            0.1,
            &[
                Intent::MOVE_LEFT,
                Intent::Rotate,
                Intent::HardDrop,
                Intent::Hold,
                Intent::PauseToggle,
            ],
        );
        assert_eq!(after, frozen);
    }

    #[test]
    fn test_pause_freezes_play() {
        let mut session = session_with(Board::new(), TetrominoType::T);
        session.advance(0.0, &[Intent::PauseToggle]);
        assert_eq!(session.state(), SessionState::Paused);

        let frozen = session.snapshot();
        session.advance(0.25, &[Intent::MOVE_LEFT, Intent::Rotate, Intent::HardDrop]);
        for _ in 0..10 {
            session.advance(0.25, &[]);
        }
        assert_eq!(session.snapshot(), frozen);

        session.advance(0.0, &[Intent::PauseToggle]);
        assert_eq!(session.state(), SessionState::Playing);
        session.advance(0.0, &[Intent::MOVE_LEFT]);
        assert_eq!(session.current().x, 3);
    }

    #[test]
    fn test_difficulty_sets_gravity() {
        let session = Session::with_seed(SessionConfig::with_difficulty(Difficulty::Hard), 1);
        assert_eq!(session.snapshot().gravity_interval, 0.5);
    }

    #[test]
    fn test_ghost_row_in_snapshot() {
        let session = session_with(Board::new(), TetrominoType::O);
        assert_eq!(session.snapshot().ghost_row, FLOOR_ROW as i32 - 3);
    }
}
