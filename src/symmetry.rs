//! Board symmetries and symmetric transposition-table lookup.
//!
//! Any transform of the 4x4 square, applied identically to all four
//! sub-boards, maps legal moves to legal moves: both halves of a move share
//! one direction, and sliding and pushing only depend on relative geometry.
//! Exchanging the two columns of sub-boards (0 with 1 and 2 with 3 at the
//! same time) is also rule-preserving, since each player keeps their home
//! pair and every passive/active pair still crosses colours. Exchanging only
//! one pair is not: it would put a home board in the same column as one of
//! its active partners. Together that makes sixteen symmetries.
//!
//! The table stores a position under its own [`BoardKey`]. A lookup tries
//! the key of every symmetric image of the probed board, and a stored move
//! is mapped back through the inverse symmetry into the probed orientation.

use std::fmt;

use crate::constants::{KEY_LEN, SIDE, SQUARES, SUB_BOARDS};
use crate::game::{Action, Board, BoardId, Direction, Player, Square};
use crate::transposition::{Entry, TranspositionTable};

/// One of the eight transforms of a 4x4 square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Identity,
    /// Quarter turn counter-clockwise.
    Rotate90,
    Rotate180,
    Rotate270,
    /// Mirror across the vertical axis (columns reversed).
    MirrorX,
    /// Mirror across the horizontal axis (rows reversed).
    MirrorY,
    /// Mirror across the main diagonal (bottom-left to top-right).
    Diagonal,
    /// Mirror across the anti-diagonal.
    AntiDiagonal,
}

impl Transform {
    pub const ALL: [Transform; 8] = [
        Transform::Identity,
        Transform::Rotate90,
        Transform::Rotate180,
        Transform::Rotate270,
        Transform::MirrorX,
        Transform::MirrorY,
        Transform::Diagonal,
        Transform::AntiDiagonal,
    ];

    pub fn inverse(self) -> Transform {
        match self {
            Transform::Rotate90 => Transform::Rotate270,
            Transform::Rotate270 => Transform::Rotate90,
            other => other,
        }
    }

    /// Image of the cell at column `x`, row `y`.
    fn map_cell(self, x: u8, y: u8) -> (u8, u8) {
        let m = SIDE - 1;
        match self {
            Transform::Identity => (x, y),
            Transform::Rotate90 => (m - y, x),
            Transform::Rotate180 => (m - x, m - y),
            Transform::Rotate270 => (y, m - x),
            Transform::MirrorX => (m - x, y),
            Transform::MirrorY => (x, m - y),
            Transform::Diagonal => (y, x),
            Transform::AntiDiagonal => (m - y, m - x),
        }
    }

    pub fn map_square(self, square: Square) -> Square {
        let (x, y) = self.map_cell(square % SIDE, square / SIDE);
        y * SIDE + x
    }

    /// Image of a direction. [`Direction::ALL`] runs clockwise from north in
    /// eighth turns, so rotations shift the index and mirrors reflect it.
    pub fn map_direction(self, direction: Direction) -> Direction {
        let i = direction as usize;
        let image = match self {
            Transform::Identity => i,
            Transform::Rotate90 => i + 6,
            Transform::Rotate180 => i + 4,
            Transform::Rotate270 => i + 2,
            Transform::MirrorX => 8 - i,
            Transform::MirrorY => 12 - i,
            Transform::Diagonal => 10 - i,
            Transform::AntiDiagonal => 14 - i,
        };
        Direction::ALL[image % 8]
    }
}

/// A symmetry of the whole board: a square transform applied to every
/// sub-board, optionally with the two sub-board columns exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symmetry {
    pub transform: Transform,
    pub swap_columns: bool,
}

impl Symmetry {
    pub const IDENTITY: Symmetry = Symmetry {
        transform: Transform::Identity,
        swap_columns: false,
    };

    /// All sixteen symmetries, identity first.
    pub fn all() -> impl Iterator<Item = Symmetry> {
        [false, true].into_iter().flat_map(|swap_columns| {
            Transform::ALL.into_iter().map(move |transform| Symmetry {
                transform,
                swap_columns,
            })
        })
    }

    pub fn inverse(self) -> Symmetry {
        // The column exchange acts on board ids only and commutes with the transform.
        Symmetry {
            transform: self.transform.inverse(),
            swap_columns: self.swap_columns,
        }
    }

    pub fn map_board_id(self, board: BoardId) -> BoardId {
        if self.swap_columns { board ^ 1 } else { board }
    }

    pub fn map_square(self, square: Square) -> Square {
        self.transform.map_square(square)
    }

    pub fn map_direction(self, direction: Direction) -> Direction {
        self.transform.map_direction(direction)
    }

    /// The image of `board` under this symmetry.
    pub fn apply(self, board: &Board) -> Board {
        let mut image = Board::empty();
        for b in 0..SUB_BOARDS as BoardId {
            for player in Player::ALL {
                for square in board.squares(b, player) {
                    image.place(self.map_board_id(b), self.map_square(square), player);
                }
            }
        }
        image
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.swap_columns {
            write!(f, "{:?}+swap", self.transform)
        } else {
            write!(f, "{:?}", self.transform)
        }
    }
}

/// Map an action on `board` to the matching action on `symmetry.apply(board)`.
pub fn remap_action(symmetry: Symmetry, action: &Action) -> Action {
    Action::new(
        symmetry.map_board_id(action.passive_board),
        symmetry.map_square(action.passive_stone),
        symmetry.map_board_id(action.active_board),
        symmetry.map_square(action.active_stone),
        symmetry.map_direction(action.direction),
        action.length,
    )
}

/// Fixed-length text encoding of a board: one character per square,
/// sub-board 0 first, squares in ascending order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey([u8; KEY_LEN]);

impl BoardKey {
    pub fn of(board: &Board) -> Self {
        let mut key = [0u8; KEY_LEN];
        for b in 0..SUB_BOARDS {
            for square in 0..SQUARES {
                key[b * SQUARES + square] = board.marker(b as BoardId, square as Square);
            }
        }
        BoardKey(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Stones of each player as `(white, black)`.
    pub fn piece_counts(&self) -> (usize, usize) {
        let white = self.0.iter().filter(|&&c| c == Player::White.marker()).count();
        let black = self.0.iter().filter(|&&c| c == Player::Black.marker()).count();
        (white, black)
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in &self.0 {
            write!(f, "{}", c as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoardKey({self})")
    }
}

/// Key of every symmetric image of `board`, tagged with the symmetry that produced it.
pub fn all_symmetric_keys(board: &Board) -> Vec<(Symmetry, BoardKey)> {
    Symmetry::all()
        .map(|symmetry| (symmetry, BoardKey::of(&symmetry.apply(board))))
        .collect()
}

/// A table entry found for a probed board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheHit {
    pub entry: Entry,
    /// Symmetry taking the probed board to the stored one.
    pub symmetry: Symmetry,
    /// The stored move, mapped into the probed orientation.
    pub action: Option<Action>,
}

/// Look up every symmetric image of `board` and return the hit most
/// favourable to the side choosing: highest value when `maximizing`,
/// lowest otherwise. Ties keep the earliest symmetry (identity first).
pub fn lookup_best(
    board: &Board,
    to_move: Player,
    table: &TranspositionTable,
    maximizing: bool,
) -> Option<CacheHit> {
    let symmetries: Vec<Symmetry> = Symmetry::all().collect();
    lookup_among(board, to_move, table, maximizing, &symmetries)
}

/// [`lookup_best`] restricted to the given symmetries.
///
/// The alpha-beta engine calls this directly with the symmetries its
/// configuration enables.
pub fn lookup_among(
    board: &Board,
    to_move: Player,
    table: &TranspositionTable,
    maximizing: bool,
    symmetries: &[Symmetry],
) -> Option<CacheHit> {
    let mut best: Option<CacheHit> = None;
    for &symmetry in symmetries {
        let key = BoardKey::of(&symmetry.apply(board));
        let Some(entry) = table.get(&key) else {
            continue;
        };
        if entry.to_move != to_move {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) if maximizing => entry.value > current.entry.value,
            Some(current) => entry.value < current.entry.value,
        };
        if better {
            best = Some(CacheHit {
                entry: *entry,
                symmetry,
                action: entry
                    .best_move
                    .map(|mv| remap_action(symmetry.inverse(), &mv)),
            });
        }
    }
    best
}
