use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info};

use crate::ai::{encode_state, Agent, RandomPlayer, Trainer, Transition};
use crate::checkpoint::{
    CheckpointHyperparameters, CheckpointManager, CheckpointMetadata, CheckpointMetrics,
    TrainingState,
};
use crate::config::AppConfig;
use crate::error::TrainingError;
use crate::game::{HipGame, Player};
use crate::training::episode::{evaluate_vs_random, EvalSummary};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};
use crate::training::replay_buffer::ReplayBuffer;
use crate::training::rewards::{RewardFn, RewardScheme};

/// Training loop configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub num_episodes: usize,
    pub reward: RewardScheme,
    /// Rolling window for loss ratios, game length and loss.
    pub stats_window: usize,
    pub log_interval: usize,
    /// Games between model saves and checkpoints.
    pub checkpoint_interval: usize,
    /// Games between evaluations against a random opponent; 0 disables them.
    pub eval_interval: usize,
    pub eval_games: usize,
    pub load_model_from: Option<PathBuf>,
    pub save_model_to: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            num_episodes: 50_000,
            reward: RewardScheme::Usual,
            stats_window: 1000,
            log_interval: 1000,
            checkpoint_interval: 50,
            eval_interval: 0,
            eval_games: 100,
            load_model_from: None,
            save_model_to: None,
        }
    }
}

/// Drives episodes of agent self-play: select, apply, reward, store, train.
pub struct TrainingSession {
    config: AppConfig,
    agent: Agent<Trainer>,
    game: HipGame,
    replay: ReplayBuffer,
    reward_fn: RewardFn,
    metrics: TrainingMetrics,
    checkpoints: Option<CheckpointManager>,
    training_steps: usize,
}

impl TrainingSession {
    pub fn new(config: AppConfig, agent: Agent<Trainer>) -> Self {
        let checkpoints = config
            .checkpoint
            .enabled
            .then(|| CheckpointManager::new(config.checkpoint.clone()));
        TrainingSession {
            game: HipGame::new(config.board.width, config.board.height),
            replay: ReplayBuffer::new(config.dqn.replay_capacity),
            reward_fn: config.training.reward.function(),
            metrics: TrainingMetrics::with_capacity(config.training.stats_window),
            checkpoints,
            training_steps: 0,
            agent,
            config,
        }
    }

    /// Build the agent from `config` and wrap it in a session.
    pub fn from_config(config: AppConfig) -> Result<Self, TrainingError> {
        let agent = Agent::from_config(&config, false)?;
        Ok(Self::new(config, agent))
    }

    /// Use a different reward function than the configured scheme.
    pub fn with_reward_fn(mut self, reward_fn: RewardFn) -> Self {
        self.reward_fn = reward_fn;
        self
    }

    /// Continue the current episode from `game` instead of an empty board.
    /// Its dimensions must match the configured board.
    pub fn with_game(mut self, game: HipGame) -> Self {
        debug_assert_eq!(
            (game.width(), game.height()),
            (self.config.board.width, self.config.board.height)
        );
        self.game = game;
        self
    }

    /// Restore weights and counters from the newest checkpoint.
    ///
    /// Returns the number of games the checkpoint had played.
    pub fn resume(&mut self) -> Result<usize, TrainingError> {
        let manager = CheckpointManager::new(self.config.checkpoint.clone());
        let data = manager.load_latest()?;
        self.agent.trainer_mut().load(&data.weights_path())?;
        self.agent.set_games_played(data.training_state.games_played);
        self.agent.set_epsilon(data.training_state.epsilon);
        self.training_steps = data.training_state.training_steps;
        info!(
            "Resumed from {} (games played: {}, epsilon: {:.3})",
            data.path.display(),
            data.training_state.games_played,
            data.training_state.epsilon
        );
        Ok(data.training_state.games_played)
    }

    /// Play `training.num_episodes` more games. Returns the total games played.
    pub fn run(&mut self) -> Result<usize, TrainingError> {
        let target = self.agent.games_played() + self.config.training.num_episodes;
        info!(
            "Starting training on a {}x{} board for {} episodes (reward: {})",
            self.config.board.width,
            self.config.board.height,
            self.config.training.num_episodes,
            self.config.training.reward
        );

        while self.agent.games_played() < target {
            self.step()?;
        }

        if let Some(path) = &self.config.training.save_model_to {
            let file = self.agent.trainer().save(path)?;
            info!("Saved model to {}", file.display());
        }
        info!(
            "Training finished after {} episodes ({} training steps)",
            self.agent.games_played(),
            self.training_steps
        );
        Ok(self.agent.games_played())
    }

    /// One environment step. Returns true when it ended the episode.
    pub fn step(&mut self) -> Result<bool, TrainingError> {
        let before = self.game.state();
        let encoded = encode_state(&before);
        let player = before.current_player();

        let Some(pos) = self.agent.select_action(&encoded) else {
            error!("No legal action for {player} in a game still in progress");
            self.metrics.record_no_action();
            // Penalized terminal transition that stays in place; cell 0 stands in
            // for the missing action.
            let penalty = (self.reward_fn)(&before, &before, None);
            self.replay.push(Transition {
                state: encoded.clone(),
                action: 0,
                reward: penalty,
                next_state: encoded,
                done: true,
            });
            self.train_on_replay();
            self.finish_episode(Some(player))?;
            return Ok(true);
        };

        if !self.game.apply_move(player, pos.x, pos.y) {
            return Err(TrainingError::IllegalMove {
                player,
                position: pos,
            });
        }

        let after = self.game.state();
        let reward = (self.reward_fn)(&before, &after, Some(pos));
        let done = after.is_terminal();
        self.replay.push(Transition {
            state: encoded,
            action: pos.index(self.config.board.width),
            reward,
            next_state: encode_state(&after),
            done,
        });

        self.train_on_replay();

        if done {
            self.finish_episode(after.loser())?;
        }
        Ok(done)
    }

    fn train_on_replay(&mut self) {
        // Too few stored transitions: skip this step.
        let Ok(batch) = self.replay.sample(self.config.dqn.batch_size) else {
            return;
        };
        let loss = self.agent.trainer_mut().train_step(&batch);
        self.metrics.record_update(loss);
        self.training_steps += 1;

        if self.training_steps % self.config.dqn.target_sync_interval == 0 {
            self.agent.trainer_mut().sync_target();
            debug!("Synced target network at training step {}", self.training_steps);
        }
    }

    fn finish_episode(&mut self, loser: Option<Player>) -> Result<(), TrainingError> {
        self.metrics.record_episode(EpisodeResult {
            loser,
            game_length: self.game.moves_count(),
        });
        self.agent.record_game();
        let games = self.agent.games_played();
        let TrainingConfig {
            log_interval,
            checkpoint_interval,
            eval_interval,
            eval_games,
            ..
        } = self.config.training;

        if games % log_interval == 0 {
            self.log_progress();
        }

        if games % checkpoint_interval == 0 {
            if let Some(path) = &self.config.training.save_model_to {
                let file = self.agent.trainer().save(path)?;
                debug!("Saved model to {}", file.display());
            }
            if let Some(manager) = &self.checkpoints {
                let path = manager.save(
                    self.agent.trainer(),
                    &self.checkpoint_metadata(),
                    &self.training_state(),
                )?;
                info!("Checkpoint saved: {}", path.display());
            }
        }

        if eval_interval > 0 && games % eval_interval == 0 {
            let summary = self.evaluate(eval_games)?;
            info!(
                "Eval vs random ({} games): agent lost {:.1}%, opponent lost {:.1}%, draws {:.1}%",
                summary.games,
                summary.agent_loss_rate() * 100.0,
                summary.opponent_losses as f32 / summary.games.max(1) as f32 * 100.0,
                summary.draw_rate() * 100.0
            );
        }

        self.game.reset();
        Ok(())
    }

    fn log_progress(&self) {
        let window = self.config.training.stats_window;
        info!(
            "Games played: {} | epsilon: {:.2} | P1 losing ratio: {:.2} | P2 losing ratio: {:.2} | draws: {:.2} | mean game length: {:.2} | mean loss: {:.4}",
            self.agent.games_played(),
            self.agent.epsilon(),
            self.metrics.loss_rate(Player::One, window),
            self.metrics.loss_rate(Player::Two, window),
            self.metrics.draw_rate(window),
            self.metrics.average_game_length(window),
            self.metrics.average_loss(window),
        );
    }

    /// Greedy games against a random opponent.
    pub fn evaluate(&mut self, games: usize) -> Result<EvalSummary, TrainingError> {
        let mut opponent = RandomPlayer::new();
        evaluate_vs_random(
            &mut self.agent,
            &mut opponent,
            self.config.board.width,
            self.config.board.height,
            games,
        )
    }

    fn checkpoint_metadata(&self) -> CheckpointMetadata {
        let window = self.config.training.stats_window;
        let dqn = &self.config.dqn;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        CheckpointMetadata {
            episode: self.agent.games_played(),
            timestamp,
            metrics: CheckpointMetrics {
                player_one_loss_rate: self.metrics.loss_rate(Player::One, window),
                player_two_loss_rate: self.metrics.loss_rate(Player::Two, window),
                draw_rate: self.metrics.draw_rate(window),
                average_game_length: self.metrics.average_game_length(window),
                average_loss: self.metrics.average_loss(window),
                training_steps: self.training_steps,
            },
            hyperparameters: CheckpointHyperparameters {
                board_width: self.config.board.width,
                board_height: self.config.board.height,
                hidden_size: dqn.hidden_size,
                learning_rate: dqn.learning_rate,
                gamma: dqn.gamma,
                epsilon_start: dqn.epsilon_start,
                epsilon_end: dqn.epsilon_end,
                epsilon_decay_games: dqn.epsilon_decay_games,
                target_sync_interval: dqn.target_sync_interval,
                batch_size: dqn.batch_size,
                replay_capacity: dqn.replay_capacity,
                reward: self.config.training.reward,
            },
        }
    }

    fn training_state(&self) -> TrainingState {
        TrainingState {
            epsilon: self.agent.epsilon(),
            games_played: self.agent.games_played(),
            training_steps: self.training_steps,
        }
    }

    pub fn agent(&self) -> &Agent<Trainer> {
        &self.agent
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn training_steps(&self) -> usize {
        self.training_steps
    }

    pub fn replay_len(&self) -> usize {
        self.replay.len()
    }

    pub fn game(&self) -> &HipGame {
        &self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ValueApproximator;
    use crate::error::ModelError;
    use crate::game::GameState;
    use crate::game::Position;

    fn small_config(episodes: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.board.width = 3;
        config.board.height = 3;
        config.dqn.hidden_size = 8;
        config.dqn.batch_size = 4;
        config.dqn.replay_capacity = 200;
        config.dqn.target_sync_interval = 5;
        config.dqn.epsilon_decay_games = 10;
        config.training.num_episodes = episodes;
        config.training.stats_window = 50;
        config.training.log_interval = 5;
        config.training.checkpoint_interval = 5;
        config
    }

    #[test]
    fn test_step_stores_transitions_until_episode_ends() {
        let mut session = TrainingSession::from_config(small_config(1)).unwrap();
        let mut steps = 0;
        loop {
            steps += 1;
            if session.step().unwrap() {
                break;
            }
        }
        assert!(steps <= 9);
        assert_eq!(session.replay_len(), steps);
        assert_eq!(session.agent().games_played(), 1);
        assert_eq!(session.metrics().total_episodes(), 1);
        // Board is reset for the next episode.
        assert_eq!(session.game().moves_count(), 0);
    }

    #[test]
    fn test_run_trains_and_saves_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(12);
        config.training.save_model_to = Some(dir.path().join("model"));

        let mut session = TrainingSession::from_config(config).unwrap();
        assert_eq!(session.run().unwrap(), 12);
        assert!(session.training_steps() > 0);
        assert_eq!(session.metrics().total_updates(), session.training_steps());
        assert!(dir.path().join("model.mpk").exists());
        assert!(session.agent().epsilon() < 1.0);
    }

    #[test]
    fn test_target_tracks_online_when_synced_every_step() {
        let mut config = small_config(3);
        config.dqn.target_sync_interval = 1;
        let mut session = TrainingSession::from_config(config).unwrap();
        session.run().unwrap();
        assert!(session.training_steps() > 0);

        let state = encode_state(&HipGame::new(3, 3).state());
        let trainer = session.agent().trainer();
        assert_eq!(trainer.score(&state), trainer.target_scores(&state));
    }

    #[test]
    fn test_checkpoint_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(10);
        config.checkpoint.enabled = true;
        config.checkpoint.checkpoint_dir = dir.path().join("ckpt");

        let mut session = TrainingSession::from_config(config.clone()).unwrap();
        session.run().unwrap();
        let steps = session.training_steps();
        let epsilon = session.agent().epsilon();

        let mut resumed = TrainingSession::from_config(config).unwrap();
        assert_eq!(resumed.resume().unwrap(), 10);
        assert_eq!(resumed.agent().games_played(), 10);
        assert_eq!(resumed.training_steps(), steps);
        assert_eq!(resumed.agent().epsilon(), epsilon);

        let state = encode_state(&HipGame::new(3, 3).state());
        let a = session.agent().trainer().score(&state);
        let b = resumed.agent().trainer().score(&state);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }

        // Continue for another batch of episodes on top of the restored count.
        assert_eq!(resumed.run().unwrap(), 20);
    }

    #[test]
    fn test_resume_without_checkpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(1);
        config.checkpoint.checkpoint_dir = dir.path().to_path_buf();
        let mut session = TrainingSession::from_config(config).unwrap();
        let err = session.resume().unwrap_err();
        assert!(matches!(err, TrainingError::Checkpoint(_)));
        assert!(err.is_missing_checkpoint());
    }

    #[test]
    fn test_resume_with_mismatched_network_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(5);
        config.checkpoint.enabled = true;
        config.checkpoint.checkpoint_dir = dir.path().join("ckpt");
        TrainingSession::from_config(config.clone())
            .unwrap()
            .run()
            .unwrap();

        config.dqn.hidden_size = 16;
        let mut session = TrainingSession::from_config(config).unwrap();
        let err = session.resume().unwrap_err();
        match &err {
            TrainingError::Model(ModelError::ShapeMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(*expected, [11, 16, 9]);
                assert_eq!(*actual, [11, 8, 9]);
            }
            other => panic!("expected shape mismatch, got {other}"),
        }
        assert!(!err.is_missing_checkpoint());
        assert_eq!(session.agent().games_played(), 0);
    }

    #[test]
    fn test_no_action_stores_penalized_terminal_transition() {
        // A finished game left on the board: the agent has nothing to play.
        let mut game = HipGame::new(3, 3);
        for (x, y) in [
            (0, 0),
            (1, 0),
            (2, 0),
            (0, 1),
            (1, 1),
            (2, 1),
            (1, 2),
            (0, 2),
            (2, 2),
        ] {
            let player = game.current_player();
            assert!(game.apply_move(player, x, y));
        }
        assert!(game.is_terminal());
        let stuck = game.current_player();
        let encoded = encode_state(&game.state());

        let mut session = TrainingSession::from_config(small_config(1))
            .unwrap()
            .with_game(game);
        assert!(session.step().unwrap());

        assert_eq!(session.replay_len(), 1);
        let stored = session.replay.sample(1).unwrap().remove(0);
        assert_eq!(stored.state, encoded);
        assert_eq!(stored.next_state, encoded);
        assert_eq!(stored.action, 0);
        assert_eq!(stored.reward, -20.0);
        assert!(stored.done);

        assert_eq!(session.metrics().no_action_events(), 1);
        assert_eq!(session.metrics().loss_rate(stuck, 1), 1.0);
        assert_eq!(session.agent().games_played(), 1);
        assert_eq!(session.game().moves_count(), 0);
    }

    #[test]
    fn test_no_action_penalty_follows_reward_scheme() {
        let mut game = HipGame::new(4, 4);
        // Player 1 closes the unit square at the origin.
        for (x, y) in [(0, 0), (3, 3), (1, 0), (3, 2), (0, 1), (3, 0), (1, 1)] {
            let player = game.current_player();
            assert!(game.apply_move(player, x, y));
        }
        assert!(game.is_terminal());

        let mut config = small_config(1);
        config.board.width = 4;
        config.board.height = 4;
        config.training.reward = RewardScheme::Cooperative;
        let mut session = TrainingSession::from_config(config).unwrap().with_game(game);
        assert!(session.step().unwrap());

        let stored = session.replay.sample(1).unwrap().remove(0);
        assert_eq!(stored.reward, -10.0);
        assert!(stored.done);
    }

    #[test]
    fn test_periodic_evaluation_runs() {
        let mut config = small_config(4);
        config.training.eval_interval = 2;
        config.training.eval_games = 4;
        let mut session = TrainingSession::from_config(config).unwrap();
        session.run().unwrap();
        assert!(!session.agent().is_play_mode());
    }

    fn always_one(_: &GameState, _: &GameState, _: Option<Position>) -> f32 {
        1.0
    }

    #[test]
    fn test_custom_reward_fn() {
        let mut session = TrainingSession::from_config(small_config(2))
            .unwrap()
            .with_reward_fn(always_one);
        session.run().unwrap();
        assert!(session.replay_len() > 0);
    }
}
