use serde::{Deserialize, Serialize};

/// Configuration for the two-snake game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Simulation ticks per second in watch mode
    pub tick_rate: u32,

    // Rewards (for RL)
    /// Reward for eating food
    pub food_reward: f32,
    /// Reward for a tick that neither eats nor dies
    pub step_penalty: f32,
    /// Reward for dying (terminal)
    pub death_penalty: f32,

    /// Random placements tried before food spawning falls back to a board scan
    pub max_food_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 20,
            tick_rate: 10,
            food_reward: 10.0,
            step_penalty: -0.1,
            death_penalty: -10.0,
            max_food_attempts: 1000,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Check that the grid can hold both starting snakes and a food cell
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 4 || self.grid_height < 1 {
            return Err(format!(
                "grid must be at least 4x1, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.grid_width > i32::MAX as usize || self.grid_height > i32::MAX as usize {
            return Err("grid dimensions exceed coordinate range".to_string());
        }

        if self.tick_rate == 0 {
            return Err("tick_rate must be at least 1".to_string());
        }

        if self.max_food_attempts == 0 {
            return Err("max_food_attempts must be at least 1".to_string());
        }

        Ok(())
    }
}
