//! Shobu-Rust: play games between search engines.
//!
//! ## Usage
//!
//! - `shobu-rust` - Show a demo
//! - `shobu-rust play -w mcts -b alphabeta` - Play one game
//! - `shobu-rust tournament -n 100 -j 8` - Play many games and report stats
//! - `shobu-rust demo` - Run the engine demo

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use shobu_rust::agent::{Agent, RandomAgent};
use shobu_rust::alphabeta::AlphaBetaEngine;
use shobu_rust::arena::{estimate_branching_factor, play_match, run_tournament};
use shobu_rust::config::{MatchConfig, SearchConfig, UctConfig};
use shobu_rust::constants::{MAX_GAME_LEN, N_SIMS};
use shobu_rust::game::{Board, Player, State};
use shobu_rust::mcts::UctEngine;

/// Shobu-Rust: alpha-beta and UCT engines for Shobu
#[derive(Parser)]
#[command(name = "shobu-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game and print the final position
    Play(AgentArgs),
    /// Play many independent games and report win statistics
    Tournament {
        #[command(flatten)]
        agents: AgentArgs,
        /// Number of games
        #[arg(short = 'n', long, default_value_t = 10)]
        games: usize,
        /// Worker threads (defaults to one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Run a short demo of both engines
    Demo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    Random,
    Alphabeta,
    Mcts,
}

#[derive(Args, Clone, Debug)]
struct AgentArgs {
    /// White player
    #[arg(short, long, value_enum, default_value_t = AgentKind::Random)]
    white: AgentKind,
    /// Black player
    #[arg(short, long, value_enum, default_value_t = AgentKind::Alphabeta)]
    black: AgentKind,
    /// Alpha-beta iterative deepening limit
    #[arg(short, long, default_value_t = 3)]
    depth: u32,
    /// UCT iterations per move
    #[arg(short, long, default_value_t = N_SIMS)]
    iterations: u32,
    /// Clock of each player, in seconds
    #[arg(short, long, default_value_t = 600)]
    time: u64,
    /// Plies after which the game is drawn
    #[arg(long, default_value_t = MAX_GAME_LEN)]
    move_limit: u32,
    /// Disable the transposition table
    #[arg(long)]
    no_table: bool,
    /// Probe the table without board symmetries
    #[arg(long)]
    no_symmetry: bool,
    /// Seed for the random and UCT agents
    #[arg(long)]
    seed: Option<u64>,
}

impl AgentArgs {
    fn match_config(&self) -> MatchConfig {
        MatchConfig {
            time_per_player: Duration::from_secs(self.time),
            move_limit: self.move_limit,
        }
    }

    fn build(&self, kind: AgentKind, player: Player, game: usize) -> Box<dyn Agent> {
        let seed = self
            .seed
            .map(|s| s.wrapping_add(2 * game as u64 + player.index() as u64));
        match kind {
            AgentKind::Random => match seed {
                Some(seed) => Box::new(RandomAgent::with_seed(seed)),
                None => Box::new(RandomAgent::new()),
            },
            AgentKind::Alphabeta => {
                let config = SearchConfig::default()
                    .with_max_depth(self.depth)
                    .with_transposition(!self.no_table)
                    .with_symmetry(!self.no_symmetry);
                Box::new(AlphaBetaEngine::new(player, config))
            }
            AgentKind::Mcts => {
                let mut config = UctConfig::default().with_iterations(self.iterations);
                if let Some(seed) = seed {
                    config = config.with_seed(seed);
                }
                Box::new(UctEngine::new(config))
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play(args)) => run_play(&args),
        Some(Commands::Tournament {
            agents,
            games,
            jobs,
        }) => run_tournament_cmd(&agents, games, jobs),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_play(args: &AgentArgs) -> Result<()> {
    let mut white = args.build(args.white, Player::White, 0);
    let mut black = args.build(args.black, Player::Black, 0);
    let report = play_match(&mut *white, &mut *black, &args.match_config());

    // Replay the history to show the final position.
    let mut state = State::from_parts(Board::initial(), Player::Black, 0, args.move_limit);
    for action in &report.history {
        state = state
            .try_apply(action)
            .context("replaying the game history")?;
    }
    println!("{state}");
    println!("{report}");
    Ok(())
}

fn run_tournament_cmd(args: &AgentArgs, games: usize, jobs: Option<usize>) -> Result<()> {
    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("configuring the worker pool")?;
    }

    let config = args.match_config();
    let stats = run_tournament(games, &config, |i| {
        (
            args.build(args.white, Player::White, i),
            args.build(args.black, Player::Black, i),
        )
    });
    println!("{stats}");
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Shobu-Rust: alpha-beta and UCT engines for Shobu\n");

    let state = State::initial();
    println!("=== Initial Position ===");
    println!("{state}");
    println!("{} legal actions for {}", state.legal_actions().len(), state.to_move());

    println!("\n=== Alpha-Beta Demo ===");
    let mut engine = AlphaBetaEngine::new(Player::Black, SearchConfig::default().with_max_depth(2));
    let result = engine.search(&state, Duration::from_secs(60))?;
    println!(
        "Best move: {} (value {:.4}, depth {}, {} nodes, {} table hits)",
        result.best_move, result.value, result.depth, result.nodes, result.table_hits
    );

    println!("\n=== UCT Demo ===");
    let mut uct = UctEngine::new(UctConfig::default().with_iterations(100));
    let action = uct.choose_action(&state, Duration::from_secs(60))?;
    println!("Best move after 100 iterations: {action}");

    println!("\n=== Branching Factor ===");
    let mut rng = fastrand::Rng::new();
    let bf = estimate_branching_factor(20, 500, &mut rng);
    println!("Average over 20 random games: {bf:.1}");
    Ok(())
}
