//! Alpha-beta search with iterative deepening and a symmetric transposition table.
//!
//! One engine covers every variant through [`SearchConfig`]: the table and the
//! symmetry probing can be switched off, and move ordering is selectable.
//!
//! Values are always from the engine's own player's point of view: nodes
//! where that player moves maximize, the others minimize. Finished games
//! score `±WIN_SCORE`.
//!
//! Each call runs iterations of depth 1, 2, ... up to `max_depth`. The first
//! iteration always completes; later ones poll a deadline at every node and
//! are thrown away if it passes, so the answer always comes from a fully
//! searched depth.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::{CommitPolicy, MoveOrdering, SearchConfig};
use crate::constants::WIN_SCORE;
use crate::error::EngineError;
use crate::eval::evaluate;
use crate::game::{Action, Player, State, classify};
use crate::symmetry::{BoardKey, CacheHit, Symmetry, lookup_among};
use crate::transposition::{Entry, PieceBuckets, PieceCount};

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub best_move: Action,
    /// Root value of the committed iteration.
    pub value: f64,
    /// Depth of the committed iteration.
    pub depth: u32,
    /// Nodes visited over all iterations.
    pub nodes: u64,
    /// Successful table probes over all iterations.
    pub table_hits: u64,
}

/// Alpha-beta engine playing one side of a game.
///
/// The engine keeps its transposition tables between moves, so an instance
/// must not be shared between games.
pub struct AlphaBetaEngine {
    player: Player,
    config: SearchConfig,
    symmetries: Vec<Symmetry>,
    tables: PieceBuckets,
    deadline: Option<Instant>,
    aborted: bool,
    nodes: u64,
    table_hits: u64,
}

impl AlphaBetaEngine {
    pub fn new(player: Player, config: SearchConfig) -> Self {
        let symmetries = if config.use_symmetry {
            Symmetry::all().collect()
        } else {
            vec![Symmetry::IDENTITY]
        };
        Self {
            player,
            config,
            symmetries,
            tables: PieceBuckets::new(),
            deadline: None,
            aborted: false,
            nodes: 0,
            table_hits: 0,
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn tables(&self) -> &PieceBuckets {
        &self.tables
    }

    pub fn clear_tables(&mut self) {
        self.tables.clear();
    }

    /// Pick a move with iterative deepening under the clock.
    pub fn choose_action(
        &mut self,
        state: &State,
        remaining: Duration,
    ) -> Result<Action, EngineError> {
        self.search(state, remaining).map(|result| result.best_move)
    }

    /// Iterative deepening search with a budget derived from `remaining`.
    pub fn search(
        &mut self,
        state: &State,
        remaining: Duration,
    ) -> Result<SearchResult, EngineError> {
        self.check_position(state)?;
        self.prepare(state);

        let budget = self.config.move_budget(remaining);
        let start = Instant::now();
        let mut committed: Option<SearchResult> = None;

        for depth in 1..=self.config.max_depth.max(1) {
            let hint = committed.as_ref().map(|r| r.best_move);
            let (value, action) = self.search_root(state, depth, hint)?;
            if self.aborted {
                debug!("depth {depth} aborted after {} nodes", self.nodes);
                break;
            }

            debug!(
                "depth {depth} value {value:.4} move {action} nodes {} elapsed {:.2?}",
                self.nodes,
                start.elapsed()
            );

            let commit = match (&committed, self.config.commit) {
                (None, _) | (_, CommitPolicy::Deepest) => true,
                (Some(best), CommitPolicy::BestValue) => value > best.value,
            };
            if commit {
                committed = Some(SearchResult {
                    best_move: action,
                    value,
                    depth,
                    nodes: self.nodes,
                    table_hits: self.table_hits,
                });
            }

            if value.abs() >= WIN_SCORE || start.elapsed() >= budget {
                break;
            }
            self.deadline = Some(start + budget);
        }

        // Depth 1 runs without a deadline, so something is always committed.
        let mut result = committed.ok_or(EngineError::TerminalPosition)?;
        result.nodes = self.nodes;
        result.table_hits = self.table_hits;
        self.verify(state, &result.best_move)?;

        info!(
            "{} plays {} (value {:.4}, depth {}, {} nodes, {} table hits, {:.2?})",
            self.player,
            result.best_move,
            result.value,
            result.depth,
            result.nodes,
            result.table_hits,
            start.elapsed()
        );
        Ok(result)
    }

    /// One pass at a fixed depth, without a deadline.
    pub fn search_depth(&mut self, state: &State, depth: u32) -> Result<SearchResult, EngineError> {
        self.check_position(state)?;
        self.prepare(state);
        let depth = depth.max(1);
        let (value, best_move) = self.search_root(state, depth, None)?;
        self.verify(state, &best_move)?;
        Ok(SearchResult {
            best_move,
            value,
            depth,
            nodes: self.nodes,
            table_hits: self.table_hits,
        })
    }

    fn check_position(&self, state: &State) -> Result<(), EngineError> {
        if state.is_terminal() {
            return Err(EngineError::TerminalPosition);
        }
        if state.to_move() != self.player {
            return Err(EngineError::WrongPlayer {
                expected: self.player,
                actual: state.to_move(),
            });
        }
        Ok(())
    }

    fn verify(&self, state: &State, action: &Action) -> Result<(), EngineError> {
        if state.is_legal(action) {
            Ok(())
        } else {
            Err(EngineError::IllegalAction {
                action: *action,
                player: self.player,
            })
        }
    }

    fn prepare(&mut self, state: &State) {
        let dropped = self.tables.purge_above(PieceCount::of(state.board()));
        if dropped > 0 {
            debug!("purged {dropped} stale table buckets");
        }
        self.deadline = None;
        self.aborted = false;
        self.nodes = 0;
        self.table_hits = 0;
    }

    fn time_up(&mut self) -> bool {
        if !self.aborted {
            if let Some(deadline) = self.deadline {
                self.aborted = Instant::now() >= deadline;
            }
        }
        self.aborted
    }

    /// Probe the table for `state`, checking that any cached move is legal here.
    fn probe(&mut self, state: &State) -> Result<Option<CacheHit>, EngineError> {
        if !self.config.use_transposition {
            return Ok(None);
        }
        let bucket = self.tables.bucket(PieceCount::of(state.board()));
        let Some(table) = bucket.filter(|table| !table.is_empty()) else {
            return Ok(None);
        };
        let maximizing = state.to_move() == self.player;
        let hit = lookup_among(
            state.board(),
            state.to_move(),
            table,
            maximizing,
            &self.symmetries,
        );

        if let Some(hit) = &hit {
            self.table_hits += 1;
            if let Some(action) = hit.action {
                if !state.is_legal(&action) {
                    return Err(EngineError::CorruptCacheEntry {
                        action,
                        symmetry: hit.symmetry,
                    });
                }
            }
        }
        Ok(hit)
    }

    fn store(
        &mut self,
        state: &State,
        value: f64,
        alpha: f64,
        beta: f64,
        best_move: Option<Action>,
        depth: u32,
    ) {
        if !self.config.use_transposition || self.aborted {
            return;
        }
        let entry = Entry::from_window(value, alpha, beta, best_move, depth, state.to_move());
        self.tables
            .bucket_mut(PieceCount::of(state.board()))
            .store(BoardKey::of(state.board()), entry);
    }

    /// Legal actions in search order.
    fn order_actions(&self, state: &State, preferred: Option<Action>) -> Vec<Action> {
        let mut actions = state.legal_actions().to_vec();
        if self.config.move_ordering == MoveOrdering::Natural {
            return actions;
        }

        let board = state.board();
        let player = state.to_move();
        actions.sort_by_cached_key(|action| Reverse(classify(board, player, action)));

        if self.config.move_ordering == MoveOrdering::CapturesAndHashMove {
            if let Some(mv) = preferred {
                if let Some(i) = actions.iter().position(|a| *a == mv) {
                    actions[..=i].rotate_right(1);
                }
            }
        }
        actions
    }

    /// Root node: the engine's player is to move, so it maximizes.
    fn search_root(
        &mut self,
        state: &State,
        depth: u32,
        hint: Option<Action>,
    ) -> Result<(f64, Action), EngineError> {
        self.nodes += 1;
        let hit = self.probe(state)?;
        let preferred = hint.or(hit.and_then(|h| h.action));

        let (alpha, beta) = (f64::NEG_INFINITY, f64::INFINITY);
        let mut a = alpha;
        let mut best_value = f64::NEG_INFINITY;
        let mut best_action = None;

        for action in self.order_actions(state, preferred) {
            let child = state.apply(&action);
            let (value, _) = self.alpha_beta(&child, a, beta, depth - 1)?;
            if value > best_value {
                best_value = value;
                best_action = Some(action);
                a = a.max(value);
            }
            if self.aborted {
                break;
            }
        }

        let best_action = best_action.ok_or(EngineError::TerminalPosition)?;
        self.store(state, best_value, alpha, beta, Some(best_action), depth);
        Ok((best_value, best_action))
    }

    fn alpha_beta(
        &mut self,
        state: &State,
        mut alpha: f64,
        mut beta: f64,
        depth: u32,
    ) -> Result<(f64, Option<Action>), EngineError> {
        self.nodes += 1;
        let aborted = self.time_up();

        if state.is_terminal() || aborted {
            let value = evaluate(state, self.player, &self.config.weights);
            self.store(state, value, alpha, beta, None, depth);
            return Ok((value, None));
        }

        let mut hash_move = None;
        if let Some(hit) = self.probe(state)? {
            let entry = hit.entry;
            if entry.depth >= depth {
                if entry.is_exact() {
                    return Ok((entry.value, hit.action));
                }
                if entry.lowerbound >= beta {
                    return Ok((entry.lowerbound, hit.action));
                }
                if entry.upperbound <= alpha {
                    return Ok((entry.upperbound, hit.action));
                }
                alpha = alpha.max(entry.lowerbound);
                beta = beta.min(entry.upperbound);
            }
            hash_move = hit.action;
        }

        if depth == 0 {
            let value = evaluate(state, self.player, &self.config.weights);
            self.store(state, value, alpha, beta, None, depth);
            return Ok((value, None));
        }

        let maximizing = state.to_move() == self.player;
        let mut best_value = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut best_action = None;
        let (mut a, mut b) = (alpha, beta);

        for action in self.order_actions(state, hash_move) {
            let child = state.apply(&action);
            let (value, _) = self.alpha_beta(&child, a, b, depth - 1)?;
            if maximizing {
                if value > best_value {
                    best_value = value;
                    best_action = Some(action);
                    a = a.max(value);
                }
            } else if value < best_value {
                best_value = value;
                best_action = Some(action);
                b = b.min(value);
            }
            if b <= a || self.aborted {
                break;
            }
        }

        self.store(state, best_value, alpha, beta, best_action, depth);
        Ok((best_value, best_action))
    }
}
