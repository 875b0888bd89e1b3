//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before reshuffling.
//! This prevents long droughts.

use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    /// Pieces left in the current bag
    queue: VecDeque<TetrominoType>,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag seeded from OS entropy
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Create a bag with a fixed seed, yielding a reproducible sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        Self {
            queue: VecDeque::with_capacity(7),
            rng,
        }
    }

    /// Get the next piece, opening a fresh bag when the current one runs out
    pub fn next(&mut self) -> TetrominoType {
        loop {
            if let Some(piece) = self.queue.pop_front() {
                return piece;
            }
            self.refill();
        }
    }

    /// Pieces still waiting in the current bag
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Refill the queue with a new shuffled bag
    fn refill(&mut self) {
        let mut new_bag = TetrominoType::all();
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}
