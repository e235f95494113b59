use serde::{Deserialize, Serialize};

use crate::training::RewardScheme;

/// Rolling statistics at checkpoint time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    pub player_one_loss_rate: f32,
    pub player_two_loss_rate: f32,
    pub draw_rate: f32,
    pub average_game_length: f32,
    pub average_loss: f32,
    pub training_steps: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub board_width: usize,
    pub board_height: usize,
    pub hidden_size: usize,
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    pub epsilon_decay_games: usize,
    pub target_sync_interval: usize,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub reward: RewardScheme,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
}

/// Loop counters written to training_state.json, enough to resume a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    pub epsilon: f32,
    pub games_played: usize,
    pub training_steps: usize,
}
