use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::board::{Board, Square};

/// Total encoding of a board's occupancy: one FEN letter (or `.`) per square,
/// a1 first. Has-moved flags are not part of the key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey([u8; 64]);

impl BoardKey {
    pub fn new(board: &Board) -> Self {
        let mut key = [b'.'; 64];
        for (slot, sq) in key.iter_mut().zip(Square::all()) {
            if let Some(piece) = board.get(sq) {
                *slot = piece.symbol() as u8;
            }
        }
        BoardKey(key)
    }
}

impl fmt::Debug for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BoardKey({})", String::from_utf8_lossy(&self.0))
    }
}

pub const DEFAULT_CAPACITY: usize = 100_000;

/// Board key to last stored score.
///
/// Entries carry no depth or side-to-move tag, so a hit may return a score
/// computed at another depth or from another perspective.
pub struct TranspositionTable {
    table: HashMap<BoardKey, i32>,
    size: usize,
    hits: u64,
    misses: u64,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TranspositionTable {
    pub fn new(size: usize) -> Self {
        Self {
            table: HashMap::with_capacity(size.min(DEFAULT_CAPACITY)),
            size: size.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Inserts or overwrites. A full table is wiped first, counters included.
    pub fn store(&mut self, key: BoardKey, score: i32) {
        if self.table.len() >= self.size {
            debug!("transposition table full at {} entries, clearing", self.table.len());
            self.clear();
        }
        self.table.insert(key, score);
    }

    /// Exact-key lookup, counted as a hit or a miss.
    pub fn lookup(&mut self, key: &BoardKey) -> Option<i32> {
        match self.table.get(key) {
            Some(&score) => {
                self.hits += 1;
                Some(score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, key: &BoardKey) -> bool {
        self.table.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Percentage of lookups that hit since the last clear.
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f32 / total as f32 * 100.0
    }
}
