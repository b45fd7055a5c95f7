//! Shobu-Rust: adversarial search engines for the board game Shobu.
//!
//! This crate provides an alpha-beta engine with iterative deepening and a
//! symmetry-aware transposition table, a UCT (Monte Carlo Tree Search)
//! engine, and a match runner to play them against each other.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and engine parameters
//! - [`game`] - Rules: board, move generation, move execution, terminal test
//! - [`symmetry`] - Board symmetries, board keys and symmetric table lookup
//! - [`transposition`] - Transposition tables partitioned by piece count
//! - [`eval`] - Static evaluation
//! - [`alphabeta`] - Alpha-beta search with iterative deepening
//! - [`mcts`] - UCT search
//! - [`playout`] - Rollouts for UCT
//! - [`agent`] - The `Agent` trait and a random agent
//! - [`arena`] - Games and tournaments between agents
//! - [`config`] - Runtime configuration
//! - [`error`] - Engine errors
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! use shobu_rust::alphabeta::AlphaBetaEngine;
//! use shobu_rust::config::SearchConfig;
//! use shobu_rust::game::{Player, State};
//!
//! // Black moves first
//! let state = State::initial();
//! let mut engine = AlphaBetaEngine::new(Player::Black, SearchConfig::for_testing());
//! let action = engine.choose_action(&state, Duration::from_secs(60)).unwrap();
//! assert!(state.is_legal(&action));
//! println!("Best move: {action}");
//! ```

pub mod agent;
pub mod alphabeta;
pub mod arena;
pub mod config;
pub mod constants;
pub mod error;
pub mod eval;
pub mod game;
pub mod mcts;
pub mod playout;
pub mod symmetry;
pub mod transposition;
