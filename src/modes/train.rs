//! Headless training mode
//!
//! Runs the arena as fast as it will go for a fixed number of ticks, logging a
//! summary per agent every `log_frequency` ticks and saving both agents every
//! `checkpoint_frequency` ticks and once more at the end.

use anyhow::{Context, Result};

use super::record_tick;
use crate::config::ArenaConfig;
use crate::metrics::TrainingStats;
use crate::rl::Arena;

/// Headless training run
pub struct TrainMode {
    arena: Arena,

    /// One tracker per snake
    stats: [TrainingStats; 2],

    config: ArenaConfig,

    /// Ticks to run
    num_ticks: u64,
}

impl TrainMode {
    /// Build the arena and load any saved weights
    ///
    /// Fails if a weights file exists but cannot be loaded.
    pub fn new(config: ArenaConfig, num_ticks: u64) -> Result<Self> {
        let mut arena = Arena::from_config(&config).context("Failed to set up the arena")?;
        arena
            .load_agents(config.weight_paths())
            .context("Failed to load saved weights")?;

        Ok(Self::with_arena(arena, config, num_ticks))
    }

    /// Train an arena that is already set up
    pub fn with_arena(arena: Arena, config: ArenaConfig, num_ticks: u64) -> Self {
        let window = config.training.stats_window;

        Self {
            arena,
            stats: [TrainingStats::new(window), TrainingStats::new(window)],
            config,
            num_ticks,
        }
    }

    /// Run the training loop, then save both agents
    ///
    /// Weights are saved even when a tick fails part way.
    pub fn run(&mut self) -> Result<()> {
        self.log_header();

        let result = self.run_loop();

        self.save().context("Failed to save final weights")?;
        result?;

        log::info!("training complete after {} ticks", self.arena.ticks());
        for idx in 0..2 {
            log::info!("{}: {}", self.arena.agent(idx).name(), self.stats[idx].format_summary());
        }

        Ok(())
    }

    fn run_loop(&mut self) -> Result<()> {
        for _ in 0..self.num_ticks {
            let outcome = self.arena.tick().context("Tick failed")?;
            record_tick(&mut self.stats, &self.arena, &outcome);

            if outcome.tick % self.config.training.log_frequency == 0 {
                self.log_progress(outcome.tick);
            }

            let checkpoint_frequency = self.config.training.checkpoint_frequency;
            if checkpoint_frequency > 0 && outcome.tick % checkpoint_frequency == 0 {
                self.save().context("Failed to save checkpoint")?;
            }
        }

        Ok(())
    }

    fn save(&self) -> Result<()> {
        self.arena.save_agents(self.config.weight_paths())?;
        Ok(())
    }

    pub fn stats(&self) -> &[TrainingStats; 2] {
        &self.stats
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    fn log_header(&self) {
        let game = &self.config.game;
        log::info!(
            "training for {} ticks on a {}x{} grid",
            self.num_ticks,
            game.grid_width,
            game.grid_height
        );
        for (idx, agent_config) in [&self.config.agent1, &self.config.agent2].into_iter().enumerate() {
            log::info!(
                "{}: {:?} {:?}, lr {}, gamma {}, epsilon {} -> {} (x{} per step), batch {}, memory {}",
                self.arena.agent(idx).name(),
                agent_config.activation,
                agent_config.hidden_dims,
                agent_config.learning_rate,
                agent_config.gamma,
                agent_config.epsilon_start,
                agent_config.epsilon_min,
                agent_config.epsilon_decay,
                agent_config.batch_size,
                agent_config.memory_capacity
            );
        }
        if let Some(seed) = self.config.seed {
            log::info!("seed: {}", seed);
        }
    }

    fn log_progress(&self, tick: u64) {
        for idx in 0..2 {
            log::info!(
                "[tick {}/{}] {} (score {}): {}",
                tick,
                self.num_ticks,
                self.arena.agent(idx).name(),
                self.arena.board().snakes[idx].score,
                self.stats[idx].format_summary()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArenaError;
    use crate::game::{GameConfig, GameEngine};
    use crate::rl::persistence::{metadata_path, model_exists, weights_path};
    use crate::rl::{Agent, ModelMetadata, State, Transition};
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> ArenaConfig {
        let mut config = ArenaConfig {
            game: GameConfig::small(),
            seed: Some(21),
            ..ArenaConfig::default()
        };
        config.agent1.batch_size = 8;
        config.agent2.batch_size = 8;
        config.training.log_frequency = 10;
        config.training.checkpoint_frequency = 0;
        config.training.agent1_weights = dir.path().join("better");
        config.training.agent2_weights = dir.path().join("worse");
        config
    }

    #[test]
    fn test_run_saves_both_agents() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let mut train_mode = TrainMode::new(config.clone(), 30).unwrap();
        train_mode.run().unwrap();

        assert_eq!(train_mode.arena().ticks(), 30);
        for path in config.weight_paths() {
            assert!(model_exists(path));
        }
        for stats in train_mode.stats() {
            assert_eq!(stats.total_steps(), 30);
            // Training starts once 8 transitions are stored
            assert_eq!(stats.total_updates(), 23);
        }
    }

    #[test]
    fn test_resume_picks_up_saved_weights() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        TrainMode::new(config.clone(), 20).unwrap().run().unwrap();

        let resumed = TrainMode::new(config, 0).unwrap();
        assert_eq!(resumed.arena().agent(0).training_steps(), 13);
        assert_eq!(resumed.arena().agent(1).training_steps(), 13);
    }

    #[test]
    fn test_corrupt_weights_abort_startup() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        // Metadata is fine, so loading gets as far as the weights
        let path = dir.path().join("better");
        let metadata = ModelMetadata::new("better", config.agent1.clone(), 0);
        std::fs::write(metadata_path(&path), serde_json::to_string(&metadata).unwrap()).unwrap();
        std::fs::write(weights_path(&path), b"garbage").unwrap();

        let err = TrainMode::new(config, 10).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ArenaError>(),
            Some(ArenaError::ModelLoad { .. })
        ));
    }

    /// Always picks an action id the game does not know; counts saves
    struct BrokenAgent {
        saves: Rc<Cell<usize>>,
    }

    impl Agent for BrokenAgent {
        fn name(&self) -> &str {
            "broken"
        }

        fn select_action(&mut self, _state: &State) -> usize {
            9
        }

        fn store(&mut self, _transition: Transition) {}

        fn train_step(&mut self) -> Option<f32> {
            None
        }

        fn epsilon(&self) -> f64 {
            0.0
        }

        fn training_steps(&self) -> usize {
            0
        }

        fn memory_len(&self) -> usize {
            0
        }

        fn save(&self, _path: &Path) -> crate::error::Result<()> {
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }

        fn load(&mut self, _path: &Path) -> crate::error::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_tick_still_saves() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let saves = Rc::new(Cell::new(0));
        let agents: [Box<dyn Agent>; 2] = [
            Box::new(BrokenAgent { saves: Rc::clone(&saves) }),
            Box::new(BrokenAgent { saves: Rc::clone(&saves) }),
        ];
        let arena = Arena::new(GameEngine::seeded(GameConfig::small(), 4), agents).unwrap();

        let mut train_mode = TrainMode::with_arena(arena, config, 10);
        let err = train_mode.run().err().unwrap();

        assert!(matches!(
            err.downcast_ref::<ArenaError>(),
            Some(ArenaError::InvalidAction(9))
        ));
        assert_eq!(saves.get(), 2);
        assert_eq!(train_mode.arena().ticks(), 0);
    }
}
