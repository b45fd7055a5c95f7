//! Transposition tables partitioned by piece count.
//!
//! Stones only ever leave the board, so once a position with fewer stones
//! has been reached no bucket with more stones of either colour can be
//! visited again. [`PieceBuckets::purge_above`] drops those buckets before
//! each search.

use std::collections::HashMap;

use crate::game::{Action, Board, Player};
use crate::symmetry::BoardKey;

/// A cached search result.
///
/// Values are from the searching engine's point of view. `lowerbound` and
/// `upperbound` are equal for an exact value; a fail-high leaves only the
/// lower bound finite, a fail-low only the upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub value: f64,
    pub lowerbound: f64,
    pub upperbound: f64,
    pub best_move: Option<Action>,
    pub depth: u32,
    pub to_move: Player,
}

impl Entry {
    /// Record `value` searched with window `(alpha, beta)`.
    pub fn from_window(
        value: f64,
        alpha: f64,
        beta: f64,
        best_move: Option<Action>,
        depth: u32,
        to_move: Player,
    ) -> Self {
        let (lowerbound, upperbound) = if value <= alpha {
            (f64::NEG_INFINITY, value)
        } else if value >= beta {
            (value, f64::INFINITY)
        } else {
            (value, value)
        };
        Self {
            value,
            lowerbound,
            upperbound,
            best_move,
            depth,
            to_move,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.lowerbound == self.upperbound
    }
}

/// Plain map from board key to entry.
#[derive(Debug, Default, Clone)]
pub struct TranspositionTable {
    entries: HashMap<BoardKey, Entry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &BoardKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Insert unconditionally.
    pub fn set(&mut self, key: BoardKey, entry: Entry) {
        self.entries.insert(key, entry);
    }

    /// Insert unless a deeper entry for the same side to move is already present.
    /// Returns whether the entry was written.
    pub fn store(&mut self, key: BoardKey, entry: Entry) -> bool {
        match self.entries.get(&key) {
            Some(old) if old.to_move == entry.to_move && old.depth > entry.depth => false,
            _ => {
                self.entries.insert(key, entry);
                true
            }
        }
    }

    pub fn remove(&mut self, key: &BoardKey) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stones on the whole board per colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceCount {
    pub white: u8,
    pub black: u8,
}

impl PieceCount {
    pub fn new(white: u8, black: u8) -> Self {
        Self { white, black }
    }

    pub fn of(board: &Board) -> Self {
        Self {
            white: board.total(Player::White) as u8,
            black: board.total(Player::Black) as u8,
        }
    }

    /// True if either colour has more stones than in `other`.
    pub fn exceeds(self, other: PieceCount) -> bool {
        self.white > other.white || self.black > other.black
    }
}

/// One transposition table per piece count.
#[derive(Debug, Default, Clone)]
pub struct PieceBuckets {
    buckets: HashMap<PieceCount, TranspositionTable>,
}

impl PieceBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every bucket that can no longer be reached from `current`.
    /// Returns the number of buckets dropped.
    pub fn purge_above(&mut self, current: PieceCount) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|count, _| !count.exceeds(current));
        before - self.buckets.len()
    }

    pub fn bucket(&self, count: PieceCount) -> Option<&TranspositionTable> {
        self.buckets.get(&count)
    }

    pub fn bucket_mut(&mut self, count: PieceCount) -> &mut TranspositionTable {
        self.buckets.entry(count).or_default()
    }

    pub fn get(&self, count: PieceCount, key: &BoardKey) -> Option<&Entry> {
        self.bucket(count).and_then(|table| table.get(key))
    }

    /// Piece counts that currently have a bucket.
    pub fn counts(&self) -> impl Iterator<Item = PieceCount> + '_ {
        self.buckets.keys().copied()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(TranspositionTable::len).sum()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
