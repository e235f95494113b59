use std::path::{Path, PathBuf};

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::TensorData;

use crate::ai::agent::Transition;
use crate::ai::approximator::ValueApproximator;
use crate::ai::networks::{ValueNetwork, ValueNetworkConfig};
use crate::ai::state_encoding::{encode_states_batch, EncodedState};
use crate::error::ModelError;

pub type InferBackend = NdArray<f32>;
pub type TrainBackend = Autodiff<InferBackend>;

/// DQN hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    pub learning_rate: f64,
    pub gamma: f32,
    pub hidden_size: usize,
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    pub epsilon_decay_games: usize,
    /// Training steps between target-network syncs.
    pub target_sync_interval: usize,
    pub batch_size: usize,
    pub replay_capacity: usize,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            learning_rate: 1e-3,
            gamma: 0.9,
            hidden_size: 256,
            epsilon_start: 1.0,
            epsilon_end: 0.01,
            epsilon_decay_games: 5000,
            target_sync_interval: 300,
            batch_size: 64,
            replay_capacity: 100_000,
        }
    }
}

/// Bellman regression targets: `reward + gamma * max_next` for live
/// transitions, the bare reward for terminal ones.
pub fn bellman_targets(rewards: &[f32], max_next: &[f32], dones: &[bool], gamma: f32) -> Vec<f32> {
    rewards
        .iter()
        .zip(max_next)
        .zip(dones)
        .map(|((&r, &next), &done)| if done { r } else { r + gamma * next })
        .collect()
}

/// Owns the online value network, its frozen target copy, and the Adam
/// optimizer that updates the online network.
pub struct Trainer {
    online: ValueNetwork<TrainBackend>,
    target: ValueNetwork<InferBackend>,
    optimizer: OptimizerAdaptor<Adam, ValueNetwork<TrainBackend>, TrainBackend>,
    network_config: ValueNetworkConfig,
    learning_rate: f64,
    gamma: f32,
    device: <TrainBackend as Backend>::Device,
}

impl Trainer {
    pub fn new(network_config: ValueNetworkConfig, learning_rate: f64, gamma: f32) -> Self {
        let device = Default::default();
        let online: ValueNetwork<TrainBackend> = network_config.init(&device);
        let target = online.valid();

        Trainer {
            online,
            target,
            optimizer: AdamConfig::new().init(),
            network_config,
            learning_rate,
            gamma,
            device,
        }
    }

    /// Trainer for a `width` x `height` board.
    pub fn for_board(width: usize, height: usize, config: &DqnConfig) -> Self {
        Self::new(
            ValueNetworkConfig::for_board(width, height, config.hidden_size),
            config.learning_rate,
            config.gamma,
        )
    }

    pub fn network_config(&self) -> &ValueNetworkConfig {
        &self.network_config
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Scores from the target network.
    pub fn target_scores(&self, state: &EncodedState) -> Vec<f32> {
        self.target.score(state)
    }

    /// One gradient step on a batch of transitions. Returns the MSE loss.
    pub fn train_step(&mut self, batch: &[Transition]) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }
        let batch_size = batch.len();
        let cells = self.network_config.output_size;

        // Q(s, ·) for every before-state: [B, cells]
        let states =
            encode_states_batch::<TrainBackend>(batch.iter().map(|t| &t.state), &self.device);
        let q_all = self.online.forward(states);

        // One-hot action mask to pick Q(s, a): [B, cells]
        let mut mask = vec![0.0f32; batch_size * cells];
        for (i, t) in batch.iter().enumerate() {
            mask[i * cells + t.action] = 1.0;
        }
        let mask = Tensor::<TrainBackend, 2>::from_data(
            TensorData::new(mask, [batch_size, cells]),
            &self.device,
        );
        let q_taken = (q_all * mask).sum_dim(1); // [B, 1]

        // Best continuation value from the target network, no gradients.
        let next_states =
            encode_states_batch::<InferBackend>(batch.iter().map(|t| &t.next_state), &self.device);
        let next_q: Vec<f32> = self
            .target
            .forward(next_states)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .expect("f32 tensor data extraction");
        let max_next: Vec<f32> = next_q
            .chunks(cells)
            .map(|row| row.iter().copied().fold(f32::NEG_INFINITY, f32::max))
            .collect();

        let rewards: Vec<f32> = batch.iter().map(|t| t.reward).collect();
        let dones: Vec<bool> = batch.iter().map(|t| t.done).collect();
        let targets = bellman_targets(&rewards, &max_next, &dones, self.gamma);
        let targets = Tensor::<TrainBackend, 2>::from_data(
            TensorData::new(targets, [batch_size, 1]),
            &self.device,
        );

        // MSE loss
        let diff = q_taken - targets;
        let loss = (diff.clone() * diff).mean();

        let loss_val: f32 = loss
            .clone()
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .expect("f32 loss tensor extraction")[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.online);
        self.online = self
            .optimizer
            .step(self.learning_rate, self.online.clone(), grads);

        loss_val
    }

    /// Overwrite the target network with the online network's parameters.
    pub fn sync_target(&mut self) {
        self.target = self.online.valid();
    }

    /// Save the online network's parameters.
    pub fn save(&self, path: &Path) -> Result<PathBuf, ModelError> {
        self.online.save(path)
    }

    /// Replace the online network with saved parameters and resync the target.
    ///
    /// On error nothing changes.
    pub fn load(&mut self, path: &Path) -> Result<(), ModelError> {
        let online = ValueNetwork::<TrainBackend>::load(&self.network_config, path, &self.device)?;
        self.online = online;
        self.optimizer = AdamConfig::new().init();
        self.sync_target();
        Ok(())
    }
}

impl ValueApproximator for Trainer {
    fn score(&self, state: &EncodedState) -> Vec<f32> {
        self.online.valid().score(state)
    }
}
