//! Constants for board geometry, search parameters and evaluation ranges.
//!
//! Everything here is a compile-time default. Runtime knobs live in
//! [`crate::config`] and start from these values.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Side length of one sub-board.
pub const SIDE: u8 = 4;

/// Squares on one sub-board.
pub const SQUARES: usize = 16;

/// Number of sub-boards.
pub const SUB_BOARDS: usize = 4;

/// Length of a board key (one character per square of the whole board).
pub const KEY_LEN: usize = SQUARES * SUB_BOARDS;

/// Longest slide a stone may make in one move.
pub const MAX_STEP: u8 = 2;

/// Stones each player starts with on every sub-board.
pub const START_STONES: u32 = 4;

/// Row 0 of a sub-board (White's starting row).
pub const BOTTOM_ROW: u16 = (1 << START_STONES) - 1;

/// Row 3 of a sub-board (Black's starting row).
pub const TOP_ROW: u16 = BOTTOM_ROW << (SIDE * (SIDE - 1));

// A starting row fills the whole edge.
const _: () = assert!(START_STONES == SIDE as u32);

/// Squares 5, 6, 9 and 10.
pub const CENTER_MASK: u16 = (1 << 5) | (1 << 6) | (1 << 9) | (1 << 10);

/// Plies after which the game is scored as a draw.
pub const MAX_GAME_LEN: u32 = 1000;

// =============================================================================
// Board Key Markers
// =============================================================================

pub const KEY_WHITE: u8 = b'o';
pub const KEY_BLACK: u8 = b'x';
pub const KEY_EMPTY: u8 = b'.';

// =============================================================================
// Alpha-Beta Parameters
// =============================================================================

/// Value of a won position. Dominates every heuristic score.
pub const WIN_SCORE: f64 = 1_000_000.0;

/// Default iterative deepening limit.
pub const MAX_DEPTH: u32 = 8;

/// Share of the remaining clock spent on one move.
pub const TIME_FRACTION: f64 = 1.0 / 40.0;

/// Hard cap on the time spent on one move.
pub const MAX_MOVE_TIME: Duration = Duration::from_secs(15);

// =============================================================================
// UCT Parameters
// =============================================================================

/// Default number of UCT iterations per move.
pub const N_SIMS: u32 = 500;

/// UCB1 exploration constant (sqrt 2).
pub const UCT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Maximum plies played in one rollout.
pub const ROLLOUT_CAP: u32 = 500;

/// Probability of playing a capture in a heuristic rollout when one exists.
pub const PROB_HEURISTIC_CAPTURE: f64 = 0.9;

// =============================================================================
// Evaluation Ranges
// =============================================================================

/// Largest minimum-per-sub-board stone difference in a live game.
pub const MATERIAL_MIN_RANGE: f64 = 3.0;

/// Largest total stone difference in a live game.
pub const MATERIAL_ALL_RANGE: f64 = 12.0;

/// Center squares across all sub-boards.
pub const POSITION_RANGE: f64 = 16.0;

/// Neighbour balance on the home boards.
pub const PROTECTION_RANGE: f64 = 24.0;

/// Legal action count difference.
pub const MOBILITY_RANGE: f64 = 300.0;

// =============================================================================
// Match Parameters
// =============================================================================

/// Clock of each player for a whole game.
pub const GAME_TIME: Duration = Duration::from_secs(600);
