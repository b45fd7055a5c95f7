//! Match runner: games between two agents under per-player clocks.
//!
//! Every returned action is checked against the legal set before it is
//! played. An engine error or an illegal action forfeits the game, and a
//! player whose clock runs out loses on time.

use std::fmt;
use std::time::{Duration, Instant};

use fastrand::Rng;
use log::{info, warn};
use rayon::prelude::*;

use crate::agent::Agent;
use crate::config::MatchConfig;
use crate::error::EngineError;
use crate::game::{Action, Board, Outcome, Player, State};

/// Why a game stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Elimination, no legal move, or the move limit.
    Rules,
    /// The player ran out of time.
    Timeout(Player),
    /// The player failed or returned an illegal action.
    Forfeit { player: Player, error: EngineError },
}

/// Result of one game.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub white: String,
    pub black: String,
    pub outcome: Outcome,
    pub termination: Termination,
    /// Actions played, in order.
    pub history: Vec<Action>,
    /// Clock time used by White and Black.
    pub time_used: [Duration; 2],
}

impl MatchReport {
    pub fn plies(&self) -> usize {
        self.history.len()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            Outcome::Win(p) => Some(p),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self.outcome {
            Outcome::Win(p) => format!("{p} wins"),
            Outcome::Draw => "draw".to_string(),
        };
        write!(
            f,
            "{} (white) vs {} (black): {} after {} plies",
            self.white,
            self.black,
            result,
            self.plies()
        )?;
        match &self.termination {
            Termination::Rules => Ok(()),
            Termination::Timeout(p) => write!(f, ", {p} ran out of time"),
            Termination::Forfeit { player, error } => write!(f, ", {player} forfeits: {error}"),
        }
    }
}

/// Play one game. Black moves first.
pub fn play_match(white: &mut dyn Agent, black: &mut dyn Agent, config: &MatchConfig) -> MatchReport {
    let mut state = State::from_parts(Board::initial(), Player::Black, 0, config.move_limit);
    let mut history = Vec::new();
    let mut time_used = [Duration::ZERO; 2];
    let mut stopped: Option<(Outcome, Termination)> = None;

    while !state.is_terminal() {
        let player = state.to_move();
        let idx = player.index();
        let agent: &mut dyn Agent = match player {
            Player::White => &mut *white,
            Player::Black => &mut *black,
        };

        let remaining = config.time_per_player.saturating_sub(time_used[idx]);
        let t0 = Instant::now();
        let result = agent.choose_action(&state, remaining);
        time_used[idx] += t0.elapsed();

        if time_used[idx] >= config.time_per_player {
            warn!("{} ({player}) ran out of time", agent.name());
            stopped = Some((Outcome::Win(player.opponent()), Termination::Timeout(player)));
            break;
        }

        match result.and_then(|action| state.try_apply(&action).map(|next| (action, next))) {
            Ok((action, next)) => {
                history.push(action);
                state = next;
            }
            Err(error) => {
                warn!("{} ({player}) forfeits: {error}", agent.name());
                stopped = Some((
                    Outcome::Win(player.opponent()),
                    Termination::Forfeit { player, error },
                ));
                break;
            }
        }
    }

    let (outcome, termination) = match stopped {
        Some(stop) => stop,
        None => (state.outcome().unwrap_or(Outcome::Draw), Termination::Rules),
    };

    let report = MatchReport {
        white: white.name(),
        black: black.name(),
        outcome,
        termination,
        history,
        time_used,
    };
    info!("{report}");
    report
}

/// Aggregate results of many games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentStats {
    pub games: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub timeouts: usize,
    pub forfeits: usize,
    pub total_plies: usize,
}

impl TournamentStats {
    pub fn record(&mut self, report: &MatchReport) {
        self.games += 1;
        match report.outcome {
            Outcome::Win(Player::White) => self.white_wins += 1,
            Outcome::Win(Player::Black) => self.black_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
        match report.termination {
            Termination::Rules => {}
            Termination::Timeout(_) => self.timeouts += 1,
            Termination::Forfeit { .. } => self.forfeits += 1,
        }
        self.total_plies += report.plies();
    }

    pub fn mean_plies(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_plies as f64 / self.games as f64
        }
    }

    /// Fraction of games won by `player`.
    pub fn win_rate(&self, player: Player) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = match player {
            Player::White => self.white_wins,
            Player::Black => self.black_wins,
        };
        wins as f64 / self.games as f64
    }
}

impl fmt::Display for TournamentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let games = self.games.max(1) as f64;
        write!(
            f,
            "{} games: white {:.3}, black {:.3}, draw {:.3}, mean plies {:.1}",
            self.games,
            self.white_wins as f64 / games,
            self.black_wins as f64 / games,
            self.draws as f64 / games,
            self.mean_plies()
        )?;
        if self.timeouts + self.forfeits > 0 {
            write!(f, " ({} timeouts, {} forfeits)", self.timeouts, self.forfeits)?;
        }
        Ok(())
    }
}

/// Play `games` independent games on the rayon pool.
///
/// `factory` builds the White and Black agents for game `i`; agents are
/// never shared between games.
pub fn run_tournament<F>(games: usize, config: &MatchConfig, factory: F) -> TournamentStats
where
    F: Fn(usize) -> (Box<dyn Agent>, Box<dyn Agent>) + Sync,
{
    let reports: Vec<MatchReport> = (0..games)
        .into_par_iter()
        .map(|i| {
            let (mut white, mut black) = factory(i);
            play_match(&mut *white, &mut *black, config)
        })
        .collect();

    let mut stats = TournamentStats::default();
    for report in &reports {
        stats.record(report);
    }
    info!("{stats}");
    stats
}

/// Average number of legal actions per position over random games.
///
/// Each game contributes its own mean; games stop at a terminal state or
/// after `max_plies`.
pub fn estimate_branching_factor(games: usize, max_plies: u32, rng: &mut Rng) -> f64 {
    let mut total = 0.0;
    for _ in 0..games {
        let mut state = State::initial();
        let mut actions = 0usize;
        let mut plies = 0u32;
        while !state.is_terminal() && plies < max_plies {
            let legal = state.legal_actions();
            actions += legal.len();
            let action = legal[rng.usize(..legal.len())];
            state = state.apply(&action);
            plies += 1;
        }
        if plies > 0 {
            total += actions as f64 / f64::from(plies);
        }
    }
    if games == 0 { 0.0 } else { total / games as f64 }
}
