pub mod handler;

pub use handler::{InputHandler, KeyAction, MAX_SPEED};
