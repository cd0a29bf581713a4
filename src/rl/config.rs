//! DQN agent hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Hidden-layer nonlinearity of the Q-network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
}

/// Configuration for one Q-learning agent
///
/// Two presets exist. [`AgentConfig::better`] is a wider ReLU network that explores
/// little, [`AgentConfig::worse`] a narrower Tanh network that explores three times as
/// much. Everything else is shared.
///
/// # Example
///
/// ```rust
/// use snake_duel::rl::AgentConfig;
///
/// let config = AgentConfig {
///     batch_size: 32,
///     ..AgentConfig::better()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Learning rate for the Adam optimizer
    pub learning_rate: f64,

    /// Discount factor for the bootstrapped target
    pub gamma: f32,

    /// Exploration rate of a freshly constructed agent
    pub epsilon_start: f64,

    /// Floor the exploration rate decays toward
    pub epsilon_min: f64,

    /// Multiplicative decay applied after every training step
    pub epsilon_decay: f64,

    /// Replay buffer capacity
    pub memory_capacity: usize,

    /// Minibatch size; training is skipped until this many transitions are stored
    pub batch_size: usize,

    pub hidden_dims: [usize; 2],

    pub activation: Activation,
}

impl AgentConfig {
    /// Wide ReLU network, low exploration
    pub fn better() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.9,
            epsilon_start: 0.1,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            memory_capacity: 10_000,
            batch_size: 64,
            hidden_dims: [64, 32],
            activation: Activation::Relu,
        }
    }

    /// Narrow Tanh network, high exploration
    pub fn worse() -> Self {
        Self {
            epsilon_start: 0.3,
            hidden_dims: [32, 32],
            activation: Activation::Tanh,
            ..Self::better()
        }
    }

    /// Check that all hyperparameters are in valid ranges
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_duel::rl::AgentConfig;
    ///
    /// let mut config = AgentConfig::worse();
    /// assert!(config.validate().is_ok());
    ///
    /// config.epsilon_min = 0.5;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            ));
        }

        if self.epsilon_min < 0.0 || self.epsilon_min > self.epsilon_start {
            return Err(format!(
                "epsilon_min must be in [0, epsilon_start={}], got {}",
                self.epsilon_start, self.epsilon_min
            ));
        }

        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.memory_capacity < self.batch_size {
            return Err(format!(
                "memory_capacity ({}) cannot be smaller than batch_size ({})",
                self.memory_capacity, self.batch_size
            ));
        }

        if self.hidden_dims.contains(&0) {
            return Err(format!(
                "hidden layer widths must be positive, got {:?}",
                self.hidden_dims
            ));
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::better()
    }
}
