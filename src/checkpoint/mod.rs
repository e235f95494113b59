mod manager;
mod metadata;

pub use manager::{CheckpointData, CheckpointManager, CheckpointManagerConfig};
pub use metadata::{CheckpointHyperparameters, CheckpointMetadata, CheckpointMetrics, TrainingState};
