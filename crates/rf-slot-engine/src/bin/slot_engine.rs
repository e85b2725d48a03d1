//! Slot engine CLI
//!
//! Usage:
//!   slot-engine spin --game classic --bet 1 --lines 20      - Evaluate one spin
//!   slot-engine simulate --game cascading --spins 100000    - Batch RTP run
//!   slot-engine validate --game my_game.yaml                - Check a game document
//!
//! `--game` takes a preset name (`classic`, `cascading`) or a JSON/YAML file.
//! Set `RUST_LOG=debug` to see class draws and exhaustion warnings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rf_slot_engine::{
    EventKind, GameDefinition, GameParser, HouseConfig, SimulationConfig, SpinEngine, SpinRequest,
    simulate,
};

#[derive(Parser)]
#[command(name = "slot-engine", about = "Slot spin engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one spin and print the result as JSON
    Spin {
        #[arg(short, long, default_value = "classic")]
        game: String,
        /// Bet per line
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        /// Active lines (defaults to all)
        #[arg(short, long)]
        lines: Option<usize>,
        /// normal | freespin
        #[arg(short, long, default_value = "normal")]
        event: String,
        /// Seed for a reproducible spin
        #[arg(short, long)]
        seed: Option<u64>,
        /// House configuration (JSON)
        #[arg(long)]
        house: Option<PathBuf>,
    },
    /// Run a batch simulation and print the report as JSON
    Simulate {
        #[arg(short, long, default_value = "classic")]
        game: String,
        #[arg(short = 'n', long, default_value_t = 100_000)]
        spins: u64,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Target RTP in percent
        #[arg(short, long)]
        target: Option<f64>,
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        #[arg(short, long)]
        lines: Option<usize>,
        #[arg(long)]
        house: Option<PathBuf>,
    },
    /// Validate a game document
    Validate {
        #[arg(short, long)]
        game: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spin {
            game,
            bet,
            lines,
            event,
            seed,
            house,
        } => run_spin(&game, bet, lines, &event, seed, house),
        Commands::Simulate {
            game,
            spins,
            seed,
            target,
            bet,
            lines,
            house,
        } => run_simulation(&game, spins, seed, target, bet, lines, house),
        Commands::Validate { game } => run_validate(&game),
    }
}

fn load_game(name: &str) -> Result<GameDefinition> {
    match name {
        "classic" => Ok(GameDefinition::classic_5x3()),
        "cascading" => Ok(GameDefinition::cascading_5x3()),
        path => GameParser::new()
            .load_path(path)
            .with_context(|| format!("Failed to load game '{}'", path)),
    }
}

fn load_house(path: Option<PathBuf>) -> Result<HouseConfig> {
    let Some(path) = path else {
        return Ok(HouseConfig::default());
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid house config {}", path.display()))
}

fn build_request(engine: &SpinEngine, bet: f64, lines: Option<usize>) -> SpinRequest {
    SpinRequest::new(bet, lines.unwrap_or(engine.game().paylines.len()))
}

fn run_spin(
    game: &str,
    bet: f64,
    lines: Option<usize>,
    event: &str,
    seed: Option<u64>,
    house: Option<PathBuf>,
) -> Result<()> {
    let engine = SpinEngine::new(load_game(game)?)?;
    let house = load_house(house)?;
    let mut request = build_request(&engine, bet, lines);
    request.event = event.parse::<EventKind>()?;

    let result = match seed {
        Some(seed) => {
            engine.evaluate_spin(&request, &house, &mut ChaCha8Rng::seed_from_u64(seed))?
        }
        None => engine.evaluate_spin_thread_rng(&request, &house)?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_simulation(
    game: &str,
    spins: u64,
    seed: u64,
    target: Option<f64>,
    bet: f64,
    lines: Option<usize>,
    house: Option<PathBuf>,
) -> Result<()> {
    let engine = SpinEngine::new(load_game(game)?)?;
    let mut house = load_house(house)?;
    if let Some(target) = target {
        house.target_percent = target;
    }
    let request = build_request(&engine, bet, lines);
    let config = SimulationConfig {
        spins,
        seed,
        ..Default::default()
    };

    let report = simulate(&engine, &request, &house, &config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_validate(game: &str) -> Result<()> {
    let game = load_game(game)?;
    game.validate()?;
    println!(
        "OK: '{}' ({} reels × {} rows, {} symbols, {} paylines{})",
        game.name,
        game.reel_count(),
        game.rows(),
        game.catalog.len(),
        game.paylines.len(),
        if game.is_cascading() { ", cascading" } else { "" }
    );
    Ok(())
}
