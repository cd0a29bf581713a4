//! Core game logic for the two-snake arena
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The training loop in `rl` drives it one tick at a time.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, Turn};
pub use config::GameConfig;
pub use engine::GameEngine;
pub use state::{Board, CollisionType, Position, Snake};
