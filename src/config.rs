//! Run configuration, optionally read from a TOML file
//!
//! Every section may be omitted. Missing sections fall back to the defaults below,
//! which pit the `better` preset (snake 1) against the `worse` preset (snake 2).
//! Agent sections, when present, must be complete.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::game::GameConfig;
use crate::rl::AgentConfig;

/// Settings for the training loop around the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Ticks between weight checkpoints, 0 disables checkpoints
    pub checkpoint_frequency: u64,
    /// Ticks between progress summaries
    pub log_frequency: u64,
    /// Episodes kept in the rolling statistics window
    pub stats_window: usize,
    pub agent1_weights: PathBuf,
    pub agent2_weights: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            checkpoint_frequency: 5_000,
            log_frequency: 1_000,
            stats_window: 100,
            agent1_weights: PathBuf::from("models/better_snake"),
            agent2_weights: PathBuf::from("models/worse_snake"),
        }
    }
}

/// Everything needed to build and run an arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub game: GameConfig,
    pub agent1: AgentConfig,
    pub agent2: AgentConfig,
    pub training: TrainingConfig,
    /// Seed for food placement and both agents' exploration; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            agent1: AgentConfig::better(),
            agent2: AgentConfig::worse(),
            training: TrainingConfig::default(),
            seed: None,
        }
    }
}

impl ArenaConfig {
    /// Read and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ArenaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ArenaError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check every section, naming the section that failed
    pub fn validate(&self) -> Result<()> {
        self.game
            .validate()
            .map_err(|e| ArenaError::InvalidConfig(format!("game: {}", e)))?;
        self.agent1
            .validate()
            .map_err(|e| ArenaError::InvalidConfig(format!("agent1: {}", e)))?;
        self.agent2
            .validate()
            .map_err(|e| ArenaError::InvalidConfig(format!("agent2: {}", e)))?;

        if self.training.log_frequency == 0 {
            return Err(ArenaError::InvalidConfig(
                "training: log_frequency must be at least 1".to_string(),
            ));
        }

        if self.training.stats_window == 0 {
            return Err(ArenaError::InvalidConfig(
                "training: stats_window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Weight paths for snake 1 and snake 2
    pub fn weight_paths(&self) -> [&Path; 2] {
        [
            self.training.agent1_weights.as_path(),
            self.training.agent2_weights.as_path(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::Activation;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ArenaConfig::default();

        assert_eq!(config.game.grid_width, 30);
        assert_eq!(config.game.grid_height, 20);
        assert_eq!(config.agent1, AgentConfig::better());
        assert_eq!(config.agent2, AgentConfig::worse());
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_can_be_parsed() {
        let result = ArenaConfig::from_file("SnakeDuel.toml");
        assert!(result.is_ok(), "Failed to parse SnakeDuel.toml: {:?}", result.err());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let file_config = ArenaConfig::from_file("SnakeDuel.toml").unwrap();
        let defaults = ArenaConfig::default();

        assert_eq!(file_config.game.grid_width, defaults.game.grid_width);
        assert_eq!(file_config.game.food_reward, defaults.game.food_reward);
        assert_eq!(file_config.agent1, defaults.agent1);
        assert_eq!(file_config.agent2, defaults.agent2);
        assert_eq!(file_config.training, defaults.training);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: ArenaConfig = toml::from_str(
            r#"
            seed = 7

            [game]
            grid_width = 12
            grid_height = 8

            [training]
            log_frequency = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.game.grid_width, 12);
        assert_eq!(config.game.tick_rate, 10);
        assert_eq!(config.training.log_frequency, 50);
        assert_eq!(config.training.checkpoint_frequency, 5_000);
        assert_eq!(config.agent2.activation, Activation::Tanh);
    }

    #[test]
    fn test_invalid_section_is_named() {
        let mut config = ArenaConfig::default();
        config.agent2.gamma = 3.0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agent2"), "unexpected error: {}", err);
    }

    #[test]
    fn test_zero_log_frequency_rejected() {
        let mut config = ArenaConfig::default();
        config.training.log_frequency = 0;
        assert!(matches!(config.validate(), Err(ArenaError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();

        let missing = ArenaConfig::from_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ArenaError::Io { .. })));

        let broken_path = dir.path().join("broken.toml");
        std::fs::write(&broken_path, "[game\ngrid_width = ").unwrap();
        let broken = ArenaConfig::from_file(&broken_path);
        assert!(matches!(broken, Err(ArenaError::ConfigParse { .. })));

        let invalid_path = dir.path().join("invalid.toml");
        std::fs::write(&invalid_path, "[game]\ngrid_width = 2\n").unwrap();
        let invalid = ArenaConfig::from_file(&invalid_path);
        assert!(matches!(invalid, Err(ArenaError::InvalidConfig(_))));
    }
}
