//! Monte Carlo Tree Search with UCB1 selection (UCT).
//!
//! Each iteration:
//! - descends from the root by UCB1 while nodes are fully expanded,
//! - expands one untried action of the node it stops at,
//! - plays a rollout from the new leaf,
//! - backs the result up the recorded path.
//!
//! Node statistics are from the point of view of the player who made the
//! move into the node, so a parent compares its children directly. The tree
//! is rebuilt for every decision.

use std::time::{Duration, Instant};

use fastrand::Rng;
use log::{debug, info};

use crate::config::UctConfig;
use crate::error::EngineError;
use crate::game::{Action, Player, State};
use crate::playout::rollout;

/// A node in the search tree.
pub struct TreeNode {
    /// The game state at this node
    pub state: State,
    /// The action that led here (`None` at the root)
    pub action: Option<Action>,
    /// Number of visits
    pub n: u32,
    /// Accumulated utility for the player who moved into this node
    pub u: f64,
    /// Expanded children
    pub children: Vec<TreeNode>,
    /// Legal actions not yet expanded
    pub untried: Vec<Action>,
}

impl TreeNode {
    pub fn new(state: State, action: Option<Action>) -> Self {
        let untried = state.legal_actions().to_vec();
        Self {
            state,
            action,
            n: 0,
            u: 0.0,
            children: Vec::new(),
            untried,
        }
    }

    /// The player whose move led to this node.
    #[inline]
    pub fn mover(&self) -> Player {
        self.state.to_move().opponent()
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Mean utility, 0 for an unvisited node.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.n > 0 { self.u / f64::from(self.n) } else { 0.0 }
    }
}

/// UCB1 score of `child` under a parent visited `parent_n` times.
/// Unvisited children come first.
pub fn ucb1(child: &TreeNode, parent_n: u32, exploration: f64) -> f64 {
    if child.n == 0 {
        return f64::INFINITY;
    }
    let n = f64::from(child.n);
    child.u / n + exploration * (f64::from(parent_n).ln() / n).sqrt()
}

/// Index of the child with the highest UCB1 score.
fn most_urgent(node: &TreeNode, exploration: f64) -> usize {
    node.children
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            ucb1(a, node.n, exploration)
                .partial_cmp(&ucb1(b, node.n, exploration))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Descend from the root to a node that is terminal, childless or has
/// untried actions. Returns the path of child indices.
fn tree_descend(tree: &TreeNode, exploration: f64) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = tree;

    while !node.state.is_terminal() && node.is_fully_expanded() && !node.children.is_empty() {
        let idx = most_urgent(node, exploration);
        path.push(idx);
        node = &node.children[idx];
    }

    path
}

fn node_at_mut<'a>(tree: &'a mut TreeNode, path: &[usize]) -> &'a mut TreeNode {
    path.iter().fold(tree, |node, &idx| &mut node.children[idx])
}

/// Expand one random untried action of the node at `path`, extending the path.
fn expand(tree: &mut TreeNode, path: &mut Vec<usize>, rng: &mut Rng) {
    let node = node_at_mut(tree, path);
    if node.state.is_terminal() || node.untried.is_empty() {
        return;
    }
    let action = node.untried.swap_remove(rng.usize(..node.untried.len()));
    let child = TreeNode::new(node.state.apply(&action), Some(action));
    node.children.push(child);
    path.push(node.children.len() - 1);
}

/// Propagate a rollout result back up the tree.
///
/// `score` is the utility for the player who moved into the leaf; the sign
/// flips once per level.
fn tree_update(tree: &mut TreeNode, path: &[usize], score: f64) {
    let mut score = if path.len() % 2 == 0 { score } else { -score };

    tree.n += 1;
    tree.u += score;

    let mut node = tree;
    for &idx in path {
        score = -score;
        node = &mut node.children[idx];
        node.n += 1;
        node.u += score;
    }
}

/// Run one select / expand / simulate / backpropagate iteration.
pub fn run_iteration(tree: &mut TreeNode, config: &UctConfig, rng: &mut Rng) {
    let mut path = tree_descend(tree, config.exploration);
    expand(tree, &mut path, rng);

    let leaf = node_at_mut(tree, &path);
    let score = rollout(
        &leaf.state,
        leaf.mover(),
        config.rollout,
        config.rollout_cap,
        rng,
    );

    tree_update(tree, &path, score);
}

/// The action of the most visited root child.
pub fn best_move(tree: &TreeNode) -> Option<Action> {
    tree.children
        .iter()
        .max_by_key(|c| c.n)
        .and_then(|c| c.action)
}

/// Log the statistics of the root's children.
pub fn dump_children(root: &TreeNode) {
    for child in &root.children {
        if let Some(action) = child.action {
            debug!(
                "move {} n={} u={:.1} mean={:.3}",
                action,
                child.n,
                child.u,
                child.mean()
            );
        }
    }
}

/// UCT engine. Builds a fresh tree for every decision.
pub struct UctEngine {
    config: UctConfig,
    rng: Rng,
}

impl UctEngine {
    pub fn new(config: UctConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &UctConfig {
        &self.config
    }

    /// Search from `state` and return the tree.
    ///
    /// Runs up to `iterations` iterations, stopping early when the budget
    /// derived from `remaining` is spent. At least one iteration always runs.
    pub fn search(&mut self, state: &State, remaining: Duration) -> Result<TreeNode, EngineError> {
        if state.is_terminal() {
            return Err(EngineError::TerminalPosition);
        }

        let budget = self.config.move_budget(remaining);
        let start = Instant::now();
        let mut root = TreeNode::new(state.clone(), None);

        for i in 0..self.config.iterations.max(1) {
            if i > 0 && start.elapsed() >= budget {
                debug!("time budget spent after {i} iterations");
                break;
            }
            run_iteration(&mut root, &self.config, &mut self.rng);
        }

        Ok(root)
    }

    /// Pick a move: the most visited child of the root.
    pub fn choose_action(
        &mut self,
        state: &State,
        remaining: Duration,
    ) -> Result<Action, EngineError> {
        let start = Instant::now();
        let root = self.search(state, remaining)?;
        dump_children(&root);

        let action = best_move(&root).ok_or(EngineError::TerminalPosition)?;
        if !state.is_legal(&action) {
            return Err(EngineError::IllegalAction {
                action,
                player: state.to_move(),
            });
        }

        info!(
            "{} plays {} ({} iterations, {:.2?})",
            state.to_move(),
            action,
            root.n,
            start.elapsed()
        );
        Ok(action)
    }
}
