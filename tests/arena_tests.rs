//! Integration tests for the match runner.

use std::thread;
use std::time::Duration;

use shobu_rust::agent::{Agent, RandomAgent};
use shobu_rust::alphabeta::AlphaBetaEngine;
use shobu_rust::arena::{Termination, play_match, run_tournament};
use shobu_rust::config::{MatchConfig, SearchConfig, UctConfig};
use shobu_rust::error::EngineError;
use shobu_rust::game::{Action, Board, Direction, Outcome, Player, State};
use shobu_rust::mcts::UctEngine;

/// Always answers with the same, usually illegal, action.
struct StubbornAgent;

impl Agent for StubbornAgent {
    fn name(&self) -> String {
        "stubborn".to_string()
    }

    fn choose_action(&mut self, _state: &State, _remaining: Duration) -> Result<Action, EngineError> {
        Ok(Action::new(0, 0, 0, 0, Direction::N, 1))
    }
}

/// Sleeps before playing a random move.
struct SlowAgent(RandomAgent);

impl Agent for SlowAgent {
    fn name(&self) -> String {
        "slow".to_string()
    }

    fn choose_action(&mut self, state: &State, remaining: Duration) -> Result<Action, EngineError> {
        thread::sleep(Duration::from_millis(30));
        self.0.choose_action(state, remaining)
    }
}

fn short_game() -> MatchConfig {
    MatchConfig {
        time_per_player: Duration::from_secs(60),
        move_limit: 60,
    }
}

#[test]
fn test_random_game_history_replays() {
    let mut white = RandomAgent::with_seed(1);
    let mut black = RandomAgent::with_seed(2);
    let config = short_game();
    let report = play_match(&mut white, &mut black, &config);

    assert_eq!(report.termination, Termination::Rules);
    assert!(report.plies() <= 60);

    let mut state = State::from_parts(Board::initial(), Player::Black, 0, config.move_limit);
    for action in &report.history {
        state = state.try_apply(action).unwrap();
    }
    assert!(state.is_terminal());
    assert_eq!(state.outcome(), Some(report.outcome));
}

#[test]
fn test_illegal_action_forfeits() {
    let mut white = RandomAgent::with_seed(1);
    let mut black = StubbornAgent;
    let report = play_match(&mut white, &mut black, &short_game());

    assert_eq!(report.outcome, Outcome::Win(Player::White));
    assert_eq!(report.plies(), 0);
    match report.termination {
        Termination::Forfeit { player, error } => {
            assert_eq!(player, Player::Black);
            assert!(matches!(error, EngineError::IllegalAction { .. }));
        }
        other => panic!("unexpected termination {other:?}"),
    }
}

#[test]
fn test_engine_error_forfeits() {
    // An alpha-beta engine set up for the wrong side refuses to move.
    let mut white = RandomAgent::with_seed(1);
    let mut black = AlphaBetaEngine::new(Player::White, SearchConfig::for_testing());
    let report = play_match(&mut white, &mut black, &short_game());
    assert_eq!(report.winner(), Some(Player::White));
    assert!(matches!(
        report.termination,
        Termination::Forfeit {
            player: Player::Black,
            error: EngineError::WrongPlayer { .. }
        }
    ));
}

#[test]
fn test_exhausted_clock_loses() {
    let mut white = RandomAgent::with_seed(3);
    let mut black = SlowAgent(RandomAgent::with_seed(4));
    let config = MatchConfig {
        time_per_player: Duration::from_millis(10),
        move_limit: 60,
    };
    let report = play_match(&mut white, &mut black, &config);
    assert_eq!(report.termination, Termination::Timeout(Player::Black));
    assert_eq!(report.winner(), Some(Player::White));
    assert!(report.time_used[Player::Black.index()] >= config.time_per_player);
}

#[test]
fn test_engines_play_legal_games() {
    let mut white = UctEngine::new(UctConfig::for_testing().with_iterations(20));
    let mut black = AlphaBetaEngine::new(Player::Black, SearchConfig::for_testing().with_max_depth(1));
    let config = MatchConfig {
        time_per_player: Duration::from_secs(120),
        move_limit: 20,
    };
    let report = play_match(&mut white, &mut black, &config);
    assert_eq!(report.termination, Termination::Rules);
    assert_eq!(report.white, "mcts(20)");
    assert_eq!(report.black, "alphabeta(d1+tt+sym)");
}

#[test]
fn test_tournament_counts_every_game() {
    let config = short_game();
    let stats = run_tournament(6, &config, |i| {
        let white: Box<dyn Agent> = Box::new(RandomAgent::with_seed(2 * i as u64));
        let black: Box<dyn Agent> = Box::new(RandomAgent::with_seed(2 * i as u64 + 1));
        (white, black)
    });
    assert_eq!(stats.games, 6);
    assert_eq!(stats.white_wins + stats.black_wins + stats.draws, 6);
    assert_eq!(stats.forfeits + stats.timeouts, 0);
    assert!(stats.mean_plies() > 0.0);
    assert!(stats.mean_plies() <= 60.0);
}
