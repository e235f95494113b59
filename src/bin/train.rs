use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use hip_square::config::AppConfig;
use hip_square::training::{RewardScheme, TrainingSession};

/// Train a Hip agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a Hip square-avoidance agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Reward shaping: usual or cooperative
    #[arg(long)]
    reward: Option<RewardScheme>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Load model parameters from this path before training
    #[arg(long)]
    load_model_from: Option<PathBuf>,

    /// Save model parameters to this path during and after training
    #[arg(long)]
    save_model_to: Option<PathBuf>,

    /// Print a config file with all default values and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        config.training.num_episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        config.dqn.learning_rate = lr;
    }
    if let Some(reward) = cli.reward {
        config.training.reward = reward;
    }
    if cli.load_model_from.is_some() {
        config.training.load_model_from = cli.load_model_from;
    }
    if cli.save_model_to.is_some() {
        config.training.save_model_to = cli.save_model_to;
    }
    config.validate().context("validating configuration")?;

    let mut session =
        TrainingSession::from_config(config).context("building the training session")?;

    if cli.resume {
        match session.resume() {
            Ok(games) => info!("Continuing from {games} games played"),
            Err(e) if e.is_missing_checkpoint() => {
                warn!("No checkpoint to resume from ({e}), starting fresh")
            }
            Err(e) => return Err(e).context("resuming from checkpoint"),
        }
    }

    let games = session.run().context("training failed")?;
    let metrics = session.metrics();
    info!(
        "Done: {} games, {} training steps, {} no-action events",
        games,
        session.training_steps(),
        metrics.no_action_events()
    );
    Ok(())
}
