use std::path::PathBuf;

use crate::game::{Player, Position};

/// Errors that can occur while saving or restoring value-network parameters.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to save model to {path}: {message}")]
    Save { path: PathBuf, message: String },

    #[error("failed to load model from {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error(
        "model shape mismatch in {path}: expected [input, hidden, output] = {expected:?}, found {actual:?}"
    )]
    ShapeMismatch {
        path: PathBuf,
        expected: [usize; 3],
        actual: [usize; 3],
    },
}

/// Errors from the experience replay buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("insufficient replay data: requested {requested}, stored {stored}")]
    InsufficientData { requested: usize, stored: usize },
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' pointer found in {0}")]
    NoLatestPointer(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training and match play.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("{player} attempted illegal move at ({}, {})", .position.x, .position.y)]
    IllegalMove { player: Player, position: Position },

    #[error("{player} produced no move in a game that is still in progress")]
    NoMove { player: Player },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl TrainingError {
    /// No checkpoint has been written yet, as opposed to one that failed to load.
    pub fn is_missing_checkpoint(&self) -> bool {
        matches!(
            self,
            TrainingError::Checkpoint(
                CheckpointError::NoLatestPointer(_) | CheckpointError::DirNotFound(_)
            )
        )
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
