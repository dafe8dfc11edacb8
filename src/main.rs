//! Slider-TD command line.
//!
//! ## Usage
//!
//! - `slider-td` / `slider-td serve` - Answer a referee on stdin/stdout
//! - `slider-td train --games 100 --weights w.txt` - Learn from refereed games
//! - `slider-td moves board.txt --player H` - Show legal moves and the evaluation
//! - `slider-td demo` - Play one game against a random mover

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use slider_td::agent::Agent;
use slider_td::board::{Board, Player};
use slider_td::config::AgentConfig;
use slider_td::constants::{
    ALPHA, BASE_DEPTH, DEEPENING_CEILING, LAMBDA, MAX_DEPTH, MAX_GAME_TURNS, MOVE_BUDGET,
    SHRINK_FACTOR,
};
use slider_td::eval::{Evaluator, FeatureSet};
use slider_td::protocol::RefereeSession;
use slider_td::search::SearchLimits;
use slider_td::selfplay::{Competitor, RandomMover, play_game, starting_board};
use slider_td::tdleaf::TdLeaf;
use slider_td::weights::Weights;

/// Slider-TD: alpha-beta search with TD-Leaf(lambda) learned evaluation
#[derive(Parser)]
#[command(name = "slider-td")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    agent: AgentArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct AgentArgs {
    /// Search depth (first iteration depth when --timed)
    #[arg(long, global = true)]
    depth: Option<usize>,

    /// Search by iterative deepening under a per-move time budget
    #[arg(long, global = true)]
    timed: bool,

    /// Per-move time budget in milliseconds; implies --timed
    #[arg(long, global = true)]
    budget_ms: Option<u64>,

    /// Deepest iteration tried when --timed
    #[arg(long, global = true, default_value_t = DEEPENING_CEILING)]
    max_depth: usize,

    /// Evaluation features
    #[arg(long, global = true, value_enum, default_value_t = FeatureSet::Basic)]
    features: FeatureSet,

    /// Weights file, loaded at game start and rewritten after learning
    #[arg(long, global = true)]
    weights: Option<PathBuf>,

    /// Learn but leave the weights file untouched
    #[arg(long, global = true)]
    no_commit: bool,

    /// Learning rate
    #[arg(long, global = true, default_value_t = ALPHA)]
    alpha: f64,

    /// Decay of future temporal differences
    #[arg(long, global = true, default_value_t = LAMBDA)]
    lambda: f64,

    /// Multiplier on the weighted feature sum before tanh
    #[arg(long, global = true, default_value_t = SHRINK_FACTOR)]
    shrink: f64,

    /// Log every search node at trace level
    #[arg(long, global = true)]
    trace: bool,
}

impl AgentArgs {
    fn to_config(&self) -> Result<AgentConfig> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            bail!("--alpha must be a positive number, got {}", self.alpha);
        }
        if !(self.lambda > 0.0 && self.lambda < 1.0) {
            bail!("--lambda must lie strictly between 0 and 1, got {}", self.lambda);
        }
        if !(self.shrink.is_finite() && self.shrink > 0.0) {
            bail!("--shrink must be a positive number, got {}", self.shrink);
        }

        let limits = if self.timed || self.budget_ms.is_some() {
            SearchLimits::Timed {
                base_depth: self.depth.unwrap_or(BASE_DEPTH),
                budget: self.budget_ms.map_or(MOVE_BUDGET, Duration::from_millis),
                max_depth: self.max_depth,
            }
        } else {
            SearchLimits::Fixed {
                depth: self.depth.unwrap_or(MAX_DEPTH),
            }
        };
        Ok(AgentConfig {
            limits,
            feature_set: self.features,
            shrink: self.shrink,
            learning: TdLeaf::new(self.alpha, self.lambda),
            weights_path: self.weights.clone(),
            commit_weights: !self.no_commit,
            trace: self.trace,
            ..AgentConfig::default()
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Opponent {
    /// Uniformly random legal moves
    Random,
    /// A non-learning copy of the agent
    Agent,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer an external referee over stdin/stdout
    Serve,
    /// Play training games, learning after each one
    Train {
        /// Number of games
        #[arg(long, default_value_t = 10)]
        games: usize,
        /// Board size
        #[arg(long, default_value_t = 5)]
        size: usize,
        #[arg(long, value_enum, default_value_t = Opponent::Random)]
        opponent: Opponent,
        /// Seed for the random mover
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Print the legal moves and evaluation of a board file
    Moves {
        board: PathBuf,
        #[arg(long, default_value = "H")]
        player: char,
    },
    /// Play one game against a random mover and print the result
    Demo {
        #[arg(long, default_value_t = 5)]
        size: usize,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.agent.to_config()?;

    match cli.command {
        Some(Commands::Serve) | None => {
            let mut session = RefereeSession::new(config);
            session.run().context("referee session failed")?;
        }
        Some(Commands::Train {
            games,
            size,
            opponent,
            seed,
        }) => run_training(config, games, size, opponent, seed)?,
        Some(Commands::Moves { board, player }) => show_moves(&config, &board, player)?,
        Some(Commands::Demo { size }) => run_demo(config, size)?,
    }
    Ok(())
}

fn run_training(
    config: AgentConfig,
    games: usize,
    size: usize,
    opponent: Opponent,
    seed: u64,
) -> Result<()> {
    let Some(path) = config.weights_path.clone() else {
        bail!("training needs --weights to keep what it learns");
    };
    let board = starting_board(size).context("cannot build the starting board")?;
    if !path.exists() {
        info!("creating {} with default weights", path.display());
        config
            .feature_set
            .default_weights(size)
            .save(&path)
            .with_context(|| format!("cannot create weights file {}", path.display()))?;
    }
    let text = board.to_string();
    let mut wins = 0;
    let mut draws = 0;

    for game in 0..games {
        // Alternate sides so both halves of the weights see play.
        let side = if game % 2 == 0 { Player::H } else { Player::V };
        let mut learner = Agent::init(size, &text, side.symbol(), config.clone())
            .with_context(|| format!("cannot start game {game}"))?;
        let mut rival: Box<dyn Competitor> = match opponent {
            Opponent::Random => Box::new(RandomMover::new(
                board.clone(),
                side.opponent(),
                seed.wrapping_add(game as u64),
            )),
            Opponent::Agent => {
                let frozen = AgentConfig {
                    learn: false,
                    ..config.clone()
                };
                Box::new(Agent::init(size, &text, side.opponent().symbol(), frozen)?)
            }
        };

        let outcome = play_game(&mut learner, rival.as_mut(), MAX_GAME_TURNS)
            .with_context(|| format!("game {game} failed"))?;
        match outcome.winner {
            Some(p) if p == side => wins += 1,
            Some(_) => {}
            None => draws += 1,
        }
        info!(
            "game {game}: learner {side}, winner {}, {} turns, weights {}",
            outcome.winner.map_or("none".to_string(), |p| p.to_string()),
            outcome.turns,
            learner.weights()
        );
    }

    println!("{wins} wins, {draws} draws, {} losses", games - wins - draws);
    Ok(())
}

fn show_moves(config: &AgentConfig, path: &Path, player: char) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read board file {}", path.display()))?;
    let board = text
        .parse::<Board>()
        .with_context(|| format!("invalid board in {}", path.display()))?;
    let player = Player::from_char(player)?;

    let evaluator = Evaluator::new(player, config.feature_set, config.shrink);
    let weights = match &config.weights_path {
        Some(p) => Weights::load(p)?,
        None => config.feature_set.default_weights(board.size()),
    };
    evaluator.check_weights(board.size(), &weights)?;

    print!("{board}");
    let moves: Vec<String> = board
        .legal_moves(player)
        .iter()
        .map(|m| m.to_string())
        .collect();
    println!("{player} moves: {}", moves.join(" "));
    println!("features: {:?}", evaluator.features(&board));
    println!("evaluation: {:.4}", evaluator.evaluate(&board, &weights));
    Ok(())
}

fn run_demo(config: AgentConfig, size: usize) -> Result<()> {
    println!("Slider-TD: agent (H) against a random mover (V)\n");

    let board = starting_board(size)?;
    let config = AgentConfig {
        learn: false,
        ..config
    };
    let mut agent = Agent::init(size, &board.to_string(), 'H', config)?;
    let mut random = RandomMover::new(board.clone(), Player::V, 42);
    print!("{board}");

    let outcome = play_game(&mut agent, &mut random, MAX_GAME_TURNS)?;
    println!("\nFinal board after {} turns:", outcome.turns);
    print!("{}", outcome.board);
    match outcome.winner {
        Some(p) => println!("{p} wins"),
        None => println!("draw"),
    }
    if let SearchLimits::Timed { budget, .. } = &agent.config().limits {
        println!("searched with {budget:?} per move");
    }
    Ok(())
}
