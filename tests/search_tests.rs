//! Integration tests for the alpha-beta engine.

use std::time::Duration;

use shobu_rust::alphabeta::AlphaBetaEngine;
use shobu_rust::config::{CommitPolicy, MoveOrdering, SearchConfig};
use shobu_rust::constants::WIN_SCORE;
use shobu_rust::error::EngineError;
use shobu_rust::eval::{EvalWeights, evaluate};
use shobu_rust::game::{Action, Board, Direction, Player, State};
use shobu_rust::transposition::PieceCount;

// =============================================================================
// Helper functions
// =============================================================================

/// Plain minimax from `player`'s point of view.
fn minimax(state: &State, depth: u32, player: Player, weights: &EvalWeights) -> f64 {
    if depth == 0 || state.is_terminal() {
        return evaluate(state, player, weights);
    }
    let values = state
        .legal_actions()
        .iter()
        .map(|a| minimax(&state.apply(a), depth - 1, player, weights));
    if state.to_move() == player {
        values.fold(f64::NEG_INFINITY, f64::max)
    } else {
        values.fold(f64::INFINITY, f64::min)
    }
}

/// One stone per colour on every sub-board.
fn sparse_position(to_move: Player) -> State {
    let board = Board::from_stones(&[
        (0, 0, Player::White),
        (0, 15, Player::Black),
        (1, 3, Player::White),
        (1, 12, Player::Black),
        (2, 5, Player::White),
        (2, 10, Player::Black),
        (3, 6, Player::White),
        (3, 9, Player::Black),
    ]);
    State::new(board, to_move)
}

/// Two stones per colour on every sub-board, close enough to interact.
fn contact_position(to_move: Player) -> State {
    let board = Board::from_stones(&[
        (0, 0, Player::White),
        (0, 5, Player::White),
        (0, 10, Player::Black),
        (0, 15, Player::Black),
        (1, 1, Player::White),
        (1, 3, Player::Black),
        (1, 12, Player::Black),
        (1, 13, Player::White),
        (2, 4, Player::White),
        (2, 6, Player::Black),
        (2, 9, Player::White),
        (2, 14, Player::Black),
        (3, 0, Player::White),
        (3, 2, Player::White),
        (3, 8, Player::Black),
        (3, 11, Player::Black),
    ]);
    State::new(board, to_move)
}

/// White to move can wipe out Black on board 1.
fn winning_capture_position() -> State {
    let board = Board::from_stones(&[
        (0, 0, Player::White),
        (0, 15, Player::Black),
        (1, 1, Player::White),
        (1, 3, Player::Black),
        (2, 0, Player::White),
        (2, 15, Player::Black),
        (3, 0, Player::White),
        (3, 15, Player::Black),
    ]);
    State::new(board, Player::White)
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

// =============================================================================
// Pruned search equals minimax
// =============================================================================

#[test]
fn test_alpha_beta_matches_minimax_without_table() {
    let weights = EvalWeights::default();
    for state in [sparse_position(Player::White), sparse_position(Player::Black)] {
        let player = state.to_move();
        let expected = minimax(&state, 3, player, &weights);
        for ordering in [MoveOrdering::Natural, MoveOrdering::Captures] {
            let config = SearchConfig::plain(3).with_move_ordering(ordering);
            let mut engine = AlphaBetaEngine::new(player, config);
            let result = engine.search_depth(&state, 3).unwrap();
            assert_close(result.value, expected);
            assert!(state.is_legal(&result.best_move));
        }
    }
}

#[test]
fn test_alpha_beta_matches_minimax_in_contact() {
    let weights = EvalWeights::default();
    let state = contact_position(Player::White);
    let expected = minimax(&state, 2, Player::White, &weights);
    let mut engine = AlphaBetaEngine::new(Player::White, SearchConfig::plain(2));
    assert_close(engine.search_depth(&state, 2).unwrap().value, expected);
}

#[test]
fn test_table_and_symmetry_keep_minimax_value() {
    let weights = EvalWeights::default();
    for state in [sparse_position(Player::Black), contact_position(Player::Black)] {
        let expected = minimax(&state, 2, Player::Black, &weights);
        for use_symmetry in [false, true] {
            let config = SearchConfig::default()
                .with_max_depth(2)
                .with_symmetry(use_symmetry);
            let mut engine = AlphaBetaEngine::new(Player::Black, config);
            let result = engine.search_depth(&state, 2).unwrap();
            assert_close(result.value, expected);
            assert!(engine.tables().entry_count() > 0);
        }
    }
}

#[test]
fn test_symmetry_finds_more_hits() {
    // The start is symmetric under a mirror with the columns exchanged, so
    // mirrored replies transpose into positions already searched.
    let state = State::initial();
    let mut plain = AlphaBetaEngine::new(Player::Black, SearchConfig::default().with_symmetry(false));
    let mut sym = AlphaBetaEngine::new(Player::Black, SearchConfig::default());
    let plain_hits = plain.search_depth(&state, 2).unwrap().table_hits;
    let sym_hits = sym.search_depth(&state, 2).unwrap().table_hits;
    assert!(sym_hits > plain_hits, "{sym_hits} <= {plain_hits}");
}

// =============================================================================
// Decisions
// =============================================================================

#[test]
fn test_finds_winning_capture() {
    let state = winning_capture_position();
    let mut engine = AlphaBetaEngine::new(Player::White, SearchConfig::for_testing());
    let result = engine.search(&state, Duration::from_secs(60)).unwrap();
    assert_eq!(result.value, WIN_SCORE);
    let next = state.apply(&result.best_move);
    assert_eq!(next.winner(), Some(Player::White));
    // A proven win stops the deepening.
    assert_eq!(result.depth, 1);
}

#[test]
fn test_depth_one_beats_losing_a_stone() {
    let state = State::initial();
    let mut engine = AlphaBetaEngine::new(Player::Black, SearchConfig::default());
    let value = engine.search_depth(&state, 1).unwrap().value;

    let mut board = Board::initial();
    board.clear_square(2, 12);
    let down_a_stone = State::new(board, Player::Black);
    let baseline = evaluate(&down_a_stone, Player::Black, &EvalWeights::default());
    assert!(value > baseline, "{value} <= {baseline}");
}

#[test]
fn test_choose_action_is_legal() {
    let state = State::initial();
    let mut engine = AlphaBetaEngine::new(Player::Black, SearchConfig::for_testing());
    let action = engine.choose_action(&state, Duration::from_secs(600)).unwrap();
    assert!(state.is_legal(&action));
}

#[test]
fn test_deepest_policy_reaches_max_depth() {
    let state = sparse_position(Player::White);
    let config = SearchConfig::for_testing().with_commit(CommitPolicy::Deepest);
    let mut engine = AlphaBetaEngine::new(Player::White, config);
    let result = engine.search(&state, Duration::from_secs(600)).unwrap();
    assert_eq!(result.depth, 2);
}

#[test]
fn test_tiny_budget_still_answers() {
    let state = State::initial();
    let mut engine = AlphaBetaEngine::new(Player::Black, SearchConfig::default());
    let result = engine.search(&state, Duration::from_millis(1)).unwrap();
    assert!(state.is_legal(&result.best_move));
    assert!(result.depth >= 1);
}

#[test]
fn test_deadline_inside_an_iteration_keeps_last_complete_depth() {
    let state = State::initial();
    let first_pass = AlphaBetaEngine::new(Player::Black, SearchConfig::default())
        .search_depth(&state, 1)
        .unwrap();

    let config = SearchConfig::default()
        .with_max_depth(6)
        .with_max_move_time(Duration::from_millis(40));
    let mut engine = AlphaBetaEngine::new(Player::Black, config);
    let result = engine.search(&state, Duration::from_secs(600)).unwrap();
    assert!(result.depth < 6);
    // A second iteration was started before the clock ran out.
    assert!(result.nodes > first_pass.nodes);
    assert!(state.is_legal(&result.best_move));

    let mut fresh = AlphaBetaEngine::new(Player::Black, SearchConfig::default());
    let fixed = fresh.search_depth(&state, result.depth).unwrap();
    assert_close(result.value, fixed.value);
}

#[test]
fn test_deepening_with_table_matches_minimax() {
    let weights = EvalWeights::default();
    for state in [sparse_position(Player::White), sparse_position(Player::Black)] {
        let player = state.to_move();
        let expected = minimax(&state, 3, player, &weights);
        let config = SearchConfig::default()
            .with_max_depth(3)
            .with_commit(CommitPolicy::Deepest);
        let mut engine = AlphaBetaEngine::new(player, config);
        let result = engine.search(&state, Duration::from_secs(600)).unwrap();
        if result.value.abs() < WIN_SCORE {
            assert_eq!(result.depth, 3);
        }
        assert_close(result.value, expected);
    }
}

// =============================================================================
// Table maintenance
// =============================================================================

#[test]
fn test_purged_buckets_stay_empty() {
    let state = contact_position(Player::White);
    let mut engine = AlphaBetaEngine::new(Player::White, SearchConfig::for_testing());
    engine.search_depth(&state, 2).unwrap();
    let start = PieceCount::of(state.board());
    assert!(engine.tables().counts().all(|c| !c.exceeds(start)));

    // A black stone goes missing, as after a capture.
    let mut board = *state.board();
    board.clear_square(3, 11);
    let later = State::new(board, Player::White);
    assert!(!later.is_terminal());
    let current = PieceCount::of(later.board());
    assert_ne!(current, start);

    engine.search_depth(&later, 2).unwrap();
    assert!(engine.tables().counts().all(|c| !c.exceeds(current)));
    assert!(engine.tables().bucket(start).is_none());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_wrong_player_is_an_error() {
    let mut engine = AlphaBetaEngine::new(Player::White, SearchConfig::for_testing());
    let err = engine.search_depth(&State::initial(), 1).unwrap_err();
    assert!(matches!(err, EngineError::WrongPlayer { .. }));
}

#[test]
fn test_terminal_position_is_an_error() {
    let mut board = Board::initial();
    for sq in 0..4 {
        board.clear_square(1, sq);
    }
    let state = State::new(board, Player::White);
    let mut engine = AlphaBetaEngine::new(Player::White, SearchConfig::for_testing());
    assert_eq!(
        engine.choose_action(&state, Duration::from_secs(1)).unwrap_err(),
        EngineError::TerminalPosition
    );
}

#[test]
fn test_error_messages() {
    let action = Action::new(0, 0, 1, 0, Direction::N, 1);
    let err = EngineError::IllegalAction {
        action,
        player: Player::White,
    };
    assert_eq!(err.to_string(), "illegal action 0:0 1:0 Nx1 for white");
}
