//! Monte Carlo rollouts (game simulation from a tree leaf).
//!
//! A rollout plays moves chosen by a [`RolloutPolicy`] until the game ends
//! or the ply cap is reached, then reports the result for one player.

use fastrand::Rng;

use crate::config::RolloutPolicy;
use crate::constants::PROB_HEURISTIC_CAPTURE;
use crate::game::{Action, MoveKind, Player, State, classify};

/// Play out `state` and return the utility for `perspective`:
/// +1 win, -1 loss, 0 draw or cap reached.
pub fn rollout(
    state: &State,
    perspective: Player,
    policy: RolloutPolicy,
    cap: u32,
    rng: &mut Rng,
) -> f64 {
    let mut current = state.clone();
    let mut plies = 0;

    while !current.is_terminal() && plies < cap {
        let Some(action) = choose_move(&current, policy, rng) else {
            break;
        };
        current = current.apply(&action);
        plies += 1;
    }

    f64::from(current.utility(perspective))
}

/// Pick a move for the side to move according to `policy`.
pub fn choose_move(state: &State, policy: RolloutPolicy, rng: &mut Rng) -> Option<Action> {
    let actions = state.legal_actions();
    if actions.is_empty() {
        return None;
    }

    if policy == RolloutPolicy::CapturesFirst && rng.f64() < PROB_HEURISTIC_CAPTURE {
        let board = state.board();
        let player = state.to_move();
        let captures: Vec<&Action> = actions
            .iter()
            .filter(|a| classify(board, player, a) == MoveKind::Capture)
            .collect();
        if !captures.is_empty() {
            return Some(*captures[rng.usize(..captures.len())]);
        }
    }

    Some(actions[rng.usize(..actions.len())])
}
