//! Integration tests for the Shobu rules.

use shobu_rust::constants::START_STONES;
use shobu_rust::error::EngineError;
use shobu_rust::game::{
    Action, Board, BoardId, Direction, MoveKind, Outcome, Player, Square, State, classify,
};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// One stone of each colour in opposite corners of every sub-board, plus `extra`.
/// Stones in `extra` replace the corner stones where they overlap.
fn corners_with(extra: &[(BoardId, Square, Player)]) -> Board {
    let mut board = Board::empty();
    for b in 0..4 {
        board.place(b, 0, Player::White);
        board.place(b, 15, Player::Black);
    }
    for &(b, sq, p) in extra {
        board.place(b, sq, p);
    }
    board
}

/// Board 1 set up for White to capture: white on 1, black on 3 and 12.
fn capture_position() -> State {
    let mut board = corners_with(&[(1, 1, Player::White), (1, 3, Player::Black), (1, 12, Player::Black)]);
    board.clear_square(1, 0);
    board.clear_square(1, 15);
    State::new(board, Player::White)
}

// =============================================================================
// Initial position
// =============================================================================

#[test]
fn test_initial_position() {
    let state = State::initial();
    assert_eq!(state.to_move(), Player::Black);
    assert_eq!(state.ply(), 0);
    assert!(!state.is_terminal());
    assert_eq!(state.board().total(Player::White), 16);
    assert_eq!(state.board().total(Player::Black), 16);
    for b in 0..4 {
        for player in Player::ALL {
            assert_eq!(state.board().count(b, player), START_STONES);
        }
    }
    assert!(!state.legal_actions().is_empty());
}

#[test]
fn test_actions_respect_home_boards_and_colours() {
    for state in [State::initial(), State::new(Board::initial(), Player::White)] {
        let player = state.to_move();
        for action in state.legal_actions() {
            assert!(player.is_home(action.passive_board), "{action}");
            assert_ne!(action.passive_board % 2, action.active_board % 2, "{action}");
            assert!((1..=2).contains(&action.length));
            assert_eq!(state.board().owner(action.passive_board, action.passive_stone), Some(player));
            assert_eq!(state.board().owner(action.active_board, action.active_stone), Some(player));
        }
    }
}

#[test]
fn test_no_captures_from_the_start() {
    let state = State::initial();
    for action in state.legal_actions() {
        assert_eq!(classify(state.board(), Player::Black, action), MoveKind::Quiet);
    }
}

// =============================================================================
// Passive and active moves
// =============================================================================

#[test]
fn test_passive_move_cannot_push() {
    // White's passive stone on board 0 has a black stone right next to it.
    let board = corners_with(&[(0, 1, Player::Black)]);
    let state = State::new(board, Player::White);
    assert!(
        !state
            .legal_actions()
            .iter()
            .any(|a| a.passive_board == 0 && a.passive_stone == 0 && a.direction == Direction::E)
    );
}

#[test]
fn test_push_moves_stone_one_beyond() {
    let board = corners_with(&[(1, 1, Player::Black), (1, 12, Player::Black)]);
    let state = State::new(board, Player::White);
    let push = Action::new(0, 0, 1, 0, Direction::E, 1);
    assert!(state.is_legal(&push));
    assert_eq!(classify(state.board(), Player::White, &push), MoveKind::Push);

    let next = state.apply(&push);
    let b = next.board();
    assert_eq!(b.owner(0, 1), Some(Player::White));
    assert_eq!(b.owner(1, 1), Some(Player::White));
    assert_eq!(b.owner(1, 2), Some(Player::Black));
    assert_eq!(b.owner(1, 0), None);
    assert_eq!(b.total(Player::Black), state.board().total(Player::Black));
    assert_eq!(next.to_move(), Player::Black);
    assert_eq!(next.ply(), 1);
}

#[test]
fn test_push_off_board_captures_exactly_one_stone() {
    let state = capture_position();
    let capture = Action::new(0, 0, 1, 1, Direction::E, 2);
    assert!(state.is_legal(&capture));
    assert_eq!(classify(state.board(), Player::White, &capture), MoveKind::Capture);

    let next = state.apply(&capture);
    let before = state.board();
    let after = next.board();
    assert_eq!(after.total(Player::White), before.total(Player::White));
    assert_eq!(after.total(Player::Black), before.total(Player::Black) - 1);
    assert_eq!(after.count(1, Player::Black), 1);
    assert_eq!(after.owner(1, 3), Some(Player::White));
    assert_eq!(after.owner(1, 12), Some(Player::Black));
    assert!(!next.is_terminal());
}

#[test]
fn test_cannot_push_two_stones() {
    let board = corners_with(&[(1, 1, Player::Black), (1, 2, Player::Black)]);
    let state = State::new(board, Player::White);
    assert!(!state.is_legal(&Action::new(0, 0, 1, 0, Direction::E, 2)));
    // Landing square taken by the second stone.
    assert!(!state.is_legal(&Action::new(0, 0, 1, 0, Direction::E, 1)));
}

#[test]
fn test_cannot_push_own_stone() {
    let board = corners_with(&[(1, 1, Player::White)]);
    let state = State::new(board, Player::White);
    assert!(!state.is_legal(&Action::new(0, 0, 1, 0, Direction::E, 1)));
    assert!(state.is_legal(&Action::new(0, 0, 1, 1, Direction::E, 1)));
}

#[test]
fn test_try_apply_rejects_illegal_action() {
    let state = State::initial();
    // Passive and active on the same colour.
    let bad = Action::new(2, 12, 0, 0, Direction::S, 1);
    assert_eq!(
        state.try_apply(&bad).unwrap_err(),
        EngineError::IllegalAction {
            action: bad,
            player: Player::Black
        }
    );
}

// =============================================================================
// Terminal positions
// =============================================================================

#[test]
fn test_emptied_sub_board_loses() {
    let mut board = Board::initial();
    for sq in 12..16 {
        board.clear_square(0, sq);
    }
    // Black has nothing left on board 0.
    let state = State::new(board, Player::Black);
    assert!(state.is_terminal());
    assert_eq!(state.outcome(), Some(Outcome::Win(Player::White)));
    assert_eq!(state.utility(Player::White), 1);
    assert_eq!(state.utility(Player::Black), -1);
    assert!(state.legal_actions().is_empty());
}

#[test]
fn test_winning_capture_ends_the_game() {
    let mut board = *capture_position().board();
    board.clear_square(1, 12);
    let state = State::new(board, Player::White);
    let next = state.apply(&Action::new(0, 0, 1, 1, Direction::E, 2));
    assert_eq!(next.winner(), Some(Player::White));
    assert_eq!(next.utility(Player::Black), -1);
}

#[test]
fn test_move_limit_draws() {
    let state = State::from_parts(Board::initial(), Player::Black, 10, 10);
    assert_eq!(state.outcome(), Some(Outcome::Draw));
    assert_eq!(state.utility(Player::White), 0);
    assert_eq!(state.winner(), None);
}

#[test]
fn test_player_without_moves_loses() {
    // White's stones on its home boards are boxed in by the edges and black stones.
    let mut board = Board::empty();
    for b in 0..2 {
        board.place(b, 0, Player::White);
        board.place(b, 1, Player::Black);
        board.place(b, 4, Player::Black);
        board.place(b, 5, Player::Black);
    }
    for b in 2..4 {
        board.place(b, 0, Player::White);
        board.place(b, 15, Player::Black);
    }
    let state = State::new(board, Player::White);
    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Player::Black));
}

#[test]
fn test_random_game_keeps_invariants() {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut state = State::initial();
    let mut stones = 32;
    while !state.is_terminal() && state.ply() < 300 {
        let actions = state.legal_actions();
        let action = actions[rng.usize(..actions.len())];
        state = state.try_apply(&action).unwrap();
        let now = state.board().total(Player::White) + state.board().total(Player::Black);
        assert!(now <= stones);
        assert!(stones - now <= 1, "a move removes at most one stone");
        stones = now;
    }
}
