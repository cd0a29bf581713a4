//! Reinforcement learning for the two-snake arena
//!
//! Provides:
//! - 6-feature egocentric state encoding
//! - Experience replay buffer
//! - Small Q-networks (ReLU and Tanh flavours)
//! - Epsilon-greedy DQN agents with weight persistence
//! - The arena that runs both agents on one board

pub mod agent;
pub mod arena;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod dqn;
pub mod network;
pub mod observation;
pub mod persistence;

pub use agent::{Agent, build_agent};
pub use arena::{AgentStep, Arena, TickOutcome};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use buffer::{ReplayBuffer, Transition};
pub use config::{Activation, AgentConfig};
pub use dqn::{DqnAgent, ReluDqnAgent, TanhDqnAgent};
pub use network::{NUM_ACTIONS, QFunction, QNetworkConfig, ReluQNetwork, TanhQNetwork};
pub use observation::{STATE_SIZE, State, encode};
pub use persistence::{ModelMetadata, load_model, save_model};
