use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use hip_square::ai::{Agent, PlayerController, RandomPlayer};
use hip_square::config::AppConfig;
use hip_square::game::{GameOutcome, Player};
use hip_square::training::play_match;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Controller {
    Agent,
    Random,
}

/// Play Hip matches between a trained agent and a random player.
#[derive(Parser)]
#[command(name = "hip", about = "Play Hip matches between automated players")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Model parameters for agent players (defaults to training.save_model_to)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Controller for Player 1
    #[arg(long, value_enum, default_value = "agent")]
    first: Controller,

    /// Controller for Player 2
    #[arg(long, value_enum, default_value = "random")]
    second: Controller,

    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,
}

fn build(kind: Controller, config: &AppConfig) -> Result<Box<dyn PlayerController>> {
    Ok(match kind {
        Controller::Agent => Box::new(
            Agent::from_config(config, true).context("loading the agent's model")?,
        ),
        Controller::Random => Box::new(RandomPlayer::new()),
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(model) = cli.model {
        config.training.load_model_from = Some(model);
    } else if config.training.load_model_from.is_none() {
        config.training.load_model_from = config.training.save_model_to.clone();
    }
    config.validate().context("validating configuration")?;

    let mut first = build(cli.first, &config)?;
    let mut second = build(cli.second, &config)?;
    let (width, height) = (config.board.width, config.board.height);

    let mut p1_losses = 0;
    let mut p2_losses = 0;
    let mut draws = 0;
    let mut total_moves = 0;

    for game in 1..=cli.games {
        let result = play_match(first.as_mut(), second.as_mut(), width, height)
            .with_context(|| format!("game {game}"))?;
        total_moves += result.moves;
        match result.outcome {
            GameOutcome::Loser(Player::One) => p1_losses += 1,
            GameOutcome::Loser(Player::Two) => p2_losses += 1,
            GameOutcome::Draw => draws += 1,
        }
        debug!(
            "Game {game}: {:?} after {} moves (square: {:?})",
            result.outcome, result.moves, result.losing_square
        );
    }

    let n = cli.games.max(1) as f32;
    info!(
        "{} ({}) vs {} ({}) on {}x{}: {} games",
        Player::One,
        first.name(),
        Player::Two,
        second.name(),
        width,
        height,
        cli.games
    );
    info!(
        "P1 losing ratio: {:.2} | P2 losing ratio: {:.2} | draws: {:.2} | mean game length: {:.2}",
        p1_losses as f32 / n,
        p2_losses as f32 / n,
        draws as f32 / n,
        total_moves as f32 / n
    );
    Ok(())
}
