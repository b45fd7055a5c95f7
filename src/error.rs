//! Errors surfaced by the engines and the match runner.
//!
//! All of these are integrity failures. Running out of time inside a search
//! is not an error: the engine answers with its last completed iteration.

use thiserror::Error;

use crate::game::{Action, Player};
use crate::symmetry::Symmetry;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An action outside the legal set was produced or submitted.
    #[error("illegal action {action} for {player}")]
    IllegalAction { action: Action, player: Player },

    /// A cached move, re-mapped through a symmetry, is not legal where it was probed.
    #[error("cached move {action} (symmetry {symmetry}) is not legal in the probed position")]
    CorruptCacheEntry { action: Action, symmetry: Symmetry },

    /// A move was requested for a finished game.
    #[error("no legal actions: the position is terminal")]
    TerminalPosition,

    /// The engine was asked to move for the other side.
    #[error("engine plays {expected} but {actual} is to move")]
    WrongPlayer { expected: Player, actual: Player },
}
