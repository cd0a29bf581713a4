//! Snake Duel - two Q-learning snakes competing for food on a shared grid
//!
//! This library provides:
//! - Core two-snake game logic (game module)
//! - DQN agents, replay memory and the arena loop tying them to the game (rl module)
//! - TUI rendering and keyboard input (render and input modules)
//! - Per-agent training statistics (metrics module)
//! - Headless training and live watch modes (modes module)

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use config::ArenaConfig;
pub use error::{ArenaError, Result};
