//! Runtime configuration of the engines and the match runner.

use std::time::Duration;

use crate::constants::{
    GAME_TIME, MAX_DEPTH, MAX_GAME_LEN, MAX_MOVE_TIME, N_SIMS, ROLLOUT_CAP, TIME_FRACTION,
    UCT_EXPLORATION,
};
use crate::eval::EvalWeights;

/// Order in which the alpha-beta engine tries moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveOrdering {
    /// Generation order.
    Natural,
    /// Captures, then other pushes, then quiet moves.
    Captures,
    /// As `Captures`, then the cached or previous-iteration best move moved to the front.
    #[default]
    CapturesAndHashMove,
}

/// Which completed iterative deepening result becomes the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Commit a deeper result only when its root value beats the committed one.
    #[default]
    BestValue,
    /// Always commit the deepest completed result.
    Deepest,
}

/// Configuration for the alpha-beta engine.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Deepest iterative deepening iteration.
    pub max_depth: u32,
    pub use_transposition: bool,
    /// Probe all sixteen symmetric images instead of the board itself.
    /// Ignored without the transposition table.
    pub use_symmetry: bool,
    pub move_ordering: MoveOrdering,
    pub commit: CommitPolicy,
    /// Share of the remaining clock spent on one move.
    pub time_fraction: f64,
    /// Upper bound on the time spent on one move.
    pub max_move_time: Duration,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            use_transposition: true,
            use_symmetry: true,
            move_ordering: MoveOrdering::default(),
            commit: CommitPolicy::default(),
            time_fraction: TIME_FRACTION,
            max_move_time: MAX_MOVE_TIME,
            weights: EvalWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Shallow search for tests.
    pub fn for_testing() -> Self {
        Self {
            max_depth: 2,
            ..Self::default()
        }
    }

    /// Fixed-depth alpha-beta without table or ordering.
    pub fn plain(max_depth: u32) -> Self {
        Self {
            max_depth,
            use_transposition: false,
            use_symmetry: false,
            move_ordering: MoveOrdering::Natural,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_transposition(mut self, enabled: bool) -> Self {
        self.use_transposition = enabled;
        self
    }

    pub fn with_symmetry(mut self, enabled: bool) -> Self {
        self.use_symmetry = enabled;
        self
    }

    pub fn with_move_ordering(mut self, ordering: MoveOrdering) -> Self {
        self.move_ordering = ordering;
        self
    }

    pub fn with_commit(mut self, commit: CommitPolicy) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_weights(mut self, weights: EvalWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_move_time(mut self, time: Duration) -> Self {
        self.max_move_time = time;
        self
    }

    /// Time to spend on a move given the remaining clock.
    pub fn move_budget(&self, remaining: Duration) -> Duration {
        remaining.mul_f64(self.time_fraction).min(self.max_move_time)
    }
}

/// How rollouts pick moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloutPolicy {
    /// Uniformly random legal moves.
    #[default]
    Random,
    /// Prefer moves that push a stone off the board.
    CapturesFirst,
}

/// Configuration for the UCT engine.
#[derive(Debug, Clone)]
pub struct UctConfig {
    /// Iterations per move. At least one always runs.
    pub iterations: u32,
    /// UCB1 exploration constant.
    pub exploration: f64,
    pub rollout: RolloutPolicy,
    /// Plies after which a rollout is scored as a draw.
    pub rollout_cap: u32,
    pub time_fraction: f64,
    pub max_move_time: Duration,
    /// Seed for reproducible play. `None` seeds from the system.
    pub seed: Option<u64>,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            iterations: N_SIMS,
            exploration: UCT_EXPLORATION,
            rollout: RolloutPolicy::default(),
            rollout_cap: ROLLOUT_CAP,
            time_fraction: TIME_FRACTION,
            max_move_time: MAX_MOVE_TIME,
            seed: None,
        }
    }
}

impl UctConfig {
    /// Few iterations and a fixed seed.
    pub fn for_testing() -> Self {
        Self {
            iterations: 50,
            rollout_cap: 100,
            seed: Some(7),
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_rollout(mut self, rollout: RolloutPolicy) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn move_budget(&self, remaining: Duration) -> Duration {
        remaining.mul_f64(self.time_fraction).min(self.max_move_time)
    }
}

/// Configuration for one game between two agents.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Clock of each player for the whole game.
    pub time_per_player: Duration,
    /// Plies after which the game is a draw.
    pub move_limit: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            time_per_player: GAME_TIME,
            move_limit: MAX_GAME_LEN,
        }
    }
}
