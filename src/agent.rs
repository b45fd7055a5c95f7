//! Players that can be seated at a game.

use std::time::Duration;

use fastrand::Rng;

use crate::alphabeta::AlphaBetaEngine;
use crate::error::EngineError;
use crate::game::{Action, State};
use crate::mcts::UctEngine;

/// Something that picks moves.
pub trait Agent {
    /// Short label for logs and reports.
    fn name(&self) -> String;

    /// Pick an action for the player to move in `state`, given the time left
    /// on that player's clock.
    fn choose_action(&mut self, state: &State, remaining: Duration) -> Result<Action, EngineError>;
}

/// Plays uniformly random legal moves.
pub struct RandomAgent {
    rng: Rng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> String {
        "random".to_string()
    }

    fn choose_action(&mut self, state: &State, _remaining: Duration) -> Result<Action, EngineError> {
        let actions = state.legal_actions();
        if actions.is_empty() {
            return Err(EngineError::TerminalPosition);
        }
        Ok(actions[self.rng.usize(..actions.len())])
    }
}

impl Agent for AlphaBetaEngine {
    fn name(&self) -> String {
        let config = self.config();
        let table = match (config.use_transposition, config.use_symmetry) {
            (false, _) => "",
            (true, false) => "+tt",
            (true, true) => "+tt+sym",
        };
        format!("alphabeta(d{}{table})", config.max_depth)
    }

    fn choose_action(&mut self, state: &State, remaining: Duration) -> Result<Action, EngineError> {
        AlphaBetaEngine::choose_action(self, state, remaining)
    }
}

impl Agent for UctEngine {
    fn name(&self) -> String {
        format!("mcts({})", self.config().iterations)
    }

    fn choose_action(&mut self, state: &State, remaining: Duration) -> Result<Action, EngineError> {
        UctEngine::choose_action(self, state, remaining)
    }
}
