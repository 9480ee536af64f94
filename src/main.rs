//! Self-play runner
//!
//! Plays the built-in engine against itself on a configurable board
//! and prints the outcome, exercising the whole control cycle from a
//! terminal. A time limit stops games that settle into endless king
//! shuffling before the repetition rule catches them.

use anyhow::Result;
use clap::Parser;
use draughts::config::GameConfig;
use draughts::engine::RandomEngine;
use draughts::game::{ControlTask, EngineSource, GameController, GameSetup, TracingDisplay};
use draughts::persist::ResultsTally;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "draughts", about = "Checkers engine self-play")]
struct Cli {
    /// Board edge length, even
    #[arg(long)]
    size: Option<u8>,

    /// Rows of men per side at game start
    #[arg(long)]
    rows: Option<u8>,

    /// Engine playing level
    #[arg(long)]
    level: Option<u8>,

    /// Minimum engine think time in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results tally file to update with the outcome
    #[arg(long)]
    tally: Option<PathBuf>,

    /// Stop the game after this many seconds
    #[arg(long, default_value_t = 60)]
    max_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path),
        None => GameConfig::default(),
    };
    let size = cli.size.unwrap_or(config.board_size);
    let rows = cli.rows.unwrap_or(config.starting_rows);
    let level = config.clamp_level(cli.level.unwrap_or(1));
    let latency = cli
        .latency_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.min_latency());

    let engine = Arc::new(RandomEngine::new(size));
    let seat = |engine: Arc<RandomEngine>| {
        EngineSource::new(engine)
            .with_level(level)
            .with_min_latency(latency)
    };
    let mut setup = GameSetup::new(
        Box::new(seat(engine.clone())),
        Box::new(seat(engine)),
    )
    .with_board(size, rows)
    .with_display(Arc::new(TracingDisplay));
    if let Some(path) = &cli.tally {
        setup = setup.with_tally(ResultsTally::new(path.clone()));
    }

    let (controller, handle) = GameController::new(setup)?;
    let mut game = tokio::spawn(controller.run());
    let phase = match tokio::time::timeout(Duration::from_secs(cli.max_secs), &mut game).await {
        Ok(finished) => finished?,
        Err(_) => {
            info!("[GAME] Time limit reached, stopping the game");
            handle.post(ControlTask::Stop);
            game.await?
        }
    };

    println!("{}", phase.message());
    if let Some(path) = cli.tally {
        let counts = ResultsTally::new(path).read()?;
        println!(
            "tally: white {} black {} draws {}",
            counts.white_wins, counts.black_wins, counts.draws
        );
    }
    Ok(())
}
