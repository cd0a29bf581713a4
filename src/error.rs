//! Error types shared by the game, the agents and the persistence layer

use std::path::PathBuf;

use burn::record::RecorderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArenaError>;

#[derive(Debug, Error)]
pub enum ArenaError {
    /// Every cell is covered by a snake, so food has nowhere to go
    #[error("no free cell for food on a {width}x{height} board")]
    BoardFull { width: usize, height: usize },

    #[error("model file not found: {0:?}")]
    ModelNotFound(PathBuf),

    #[error("failed to load model weights from {path:?}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: RecorderError,
    },

    #[error("failed to save model weights to {path:?}: {source}")]
    ModelSave {
        path: PathBuf,
        #[source]
        source: RecorderError,
    },

    #[error("model at {path:?} holds a {found} network, expected {expected}")]
    IncompatibleModel {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("model metadata error for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("agent produced action id {0}, expected 0..3")]
    InvalidAction(usize),
}
