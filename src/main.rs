use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use snake_duel::ArenaConfig;
use snake_duel::modes::{TrainMode, WatchMode};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "SnakeDuel.toml";

#[derive(Parser)]
#[command(name = "snake_duel")]
#[command(version, about = "Two Q-learning snakes competing on one grid")]
struct Cli {
    /// Run mode
    #[arg(long, default_value = "watch")]
    mode: Mode,

    /// TOML configuration file (defaults to SnakeDuel.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks to run in train mode
    #[arg(long, default_value = "100000")]
    ticks: u64,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Seed for food placement and exploration
    #[arg(long)]
    seed: Option<u64>,

    /// Weights path for snake 1 (without extension)
    #[arg(long)]
    agent1_weights: Option<PathBuf>,

    /// Weights path for snake 2 (without extension)
    #[arg(long)]
    agent2_weights: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train headless for a fixed number of ticks
    Train,
    /// Watch the duel in the terminal while both agents keep learning
    Watch,
}

impl Cli {
    fn arena_config(&self) -> Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None if Path::new(DEFAULT_CONFIG).exists() => ArenaConfig::from_file(DEFAULT_CONFIG)
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG))?,
            None => ArenaConfig::default(),
        };

        if let Some(width) = self.width {
            config.game.grid_width = width;
        }
        if let Some(height) = self.height {
            config.game.grid_height = height;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(path) = &self.agent1_weights {
            config.training.agent1_weights = path.clone();
        }
        if let Some(path) = &self.agent2_weights {
            config.training.agent2_weights = path.clone();
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.arena_config()?;

    match cli.mode {
        Mode::Train => {
            let mut train_mode = TrainMode::new(config, cli.ticks)?;
            train_mode.run()?;
        }
        Mode::Watch => {
            let mut watch_mode = WatchMode::new(config)?;
            watch_mode.run().await?;
        }
    }

    Ok(())
}
