//! Static evaluation of Shobu positions.
//!
//! The score is a weighted sum of independent terms, each scaled to
//! `[-1, 1]`. Finished games short-circuit to `±WIN_SCORE` so that proven
//! results always outrank heuristic ones.

use crate::constants::{
    CENTER_MASK, MATERIAL_ALL_RANGE, MATERIAL_MIN_RANGE, MOBILITY_RANGE, POSITION_RANGE,
    PROTECTION_RANGE, SQUARES, SUB_BOARDS, WIN_SCORE,
};
use crate::game::{Board, BoardId, Player, State, legal_actions_for};

/// Weights of the evaluation terms.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalWeights {
    /// Stone count term.
    pub material: f64,
    /// Share of the material term taken by the weakest sub-board.
    /// Losing every stone on any one board loses the game.
    pub material_min_share: f64,
    /// Stones on the four center squares of each sub-board.
    pub position: f64,
    /// Friendly minus hostile neighbours of stones on their home boards.
    pub protection: f64,
    /// Legal action count difference. Expensive, off by default.
    pub mobility: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 0.55,
            material_min_share: 0.7,
            position: 0.3,
            protection: 0.15,
            mobility: 0.0,
        }
    }
}

impl EvalWeights {
    /// Material only.
    pub fn material_only() -> Self {
        Self {
            material: 1.0,
            material_min_share: 0.7,
            position: 0.0,
            protection: 0.0,
            mobility: 0.0,
        }
    }

    pub fn with_mobility(mut self, weight: f64) -> Self {
        self.mobility = weight;
        self
    }
}

const fn neighbour_mask(square: usize) -> u16 {
    let x = (square % 4) as i32;
    let y = (square / 4) as i32;
    let mut mask = 0u16;
    let mut dy = -1;
    while dy <= 1 {
        let mut dx = -1;
        while dx <= 1 {
            let (nx, ny) = (x + dx, y + dy);
            if (dx != 0 || dy != 0) && nx >= 0 && nx < 4 && ny >= 0 && ny < 4 {
                mask |= 1u16 << (ny * 4 + nx);
            }
            dx += 1;
        }
        dy += 1;
    }
    mask
}

/// Eight-neighbourhood of every square, clipped at the edges.
const NEIGHBOURS: [u16; SQUARES] = {
    let mut table = [0u16; SQUARES];
    let mut i = 0;
    while i < SQUARES {
        table[i] = neighbour_mask(i);
        i += 1;
    }
    table
};

#[inline]
fn scale(x: f64, range: f64) -> f64 {
    (x / range).clamp(-1.0, 1.0)
}

fn boards() -> impl Iterator<Item = BoardId> {
    0..SUB_BOARDS as BoardId
}

/// Stones of `player` on center squares.
fn centre(board: &Board, player: Player) -> i32 {
    boards()
        .map(|b| (board.stones(b, player) & CENTER_MASK).count_ones() as i32)
        .sum()
}

/// Friendly minus hostile neighbours of `player`'s stones on their home boards.
fn structure(board: &Board, player: Player) -> i32 {
    let mut score = 0;
    for b in player.home_boards() {
        let own = board.stones(b, player);
        let theirs = board.stones(b, player.opponent());
        for square in board.squares(b, player) {
            let around = NEIGHBOURS[square as usize];
            score += (around & own).count_ones() as i32;
            score -= (around & theirs).count_ones() as i32;
        }
    }
    score
}

/// Score `state` from `player`'s point of view.
pub fn evaluate(state: &State, player: Player, weights: &EvalWeights) -> f64 {
    if state.is_terminal() {
        return f64::from(state.utility(player)) * WIN_SCORE;
    }

    let board = state.board();
    let opponent = player.opponent();

    let min_diff = board.min_count(player) as f64 - board.min_count(opponent) as f64;
    let all_diff = board.total(player) as f64 - board.total(opponent) as f64;
    let material = weights.material_min_share * scale(min_diff, MATERIAL_MIN_RANGE)
        + (1.0 - weights.material_min_share) * scale(all_diff, MATERIAL_ALL_RANGE);

    let position = scale(
        f64::from(centre(board, player) - centre(board, opponent)),
        POSITION_RANGE,
    );

    let protection = scale(
        f64::from(structure(board, player) - structure(board, opponent)),
        PROTECTION_RANGE,
    );

    let mut score =
        weights.material * material + weights.position * position + weights.protection * protection;

    if weights.mobility != 0.0 {
        let mine = legal_actions_for(board, player).len() as f64;
        let theirs = legal_actions_for(board, opponent).len() as f64;
        score += weights.mobility * scale(mine - theirs, MOBILITY_RANGE);
    }

    score
}
