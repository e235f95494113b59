use std::path::Path;

use log::warn;

use crate::ai::DqnConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::training::TrainingConfig;

/// Board dimensions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            width: 6,
            height: 6,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub dqn: DqnConfig,
    pub training: TrainingConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.width == 0 || self.board.height == 0 {
            return Err(ConfigError::Validation(
                "board.width and board.height must be > 0".into(),
            ));
        }

        let dqn = &self.dqn;
        if dqn.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "dqn.learning_rate must be > 0".into(),
            ));
        }
        if dqn.gamma <= 0.0 || dqn.gamma >= 1.0 {
            return Err(ConfigError::Validation("dqn.gamma must be in (0, 1)".into()));
        }
        if dqn.hidden_size == 0 {
            return Err(ConfigError::Validation(
                "dqn.hidden_size must be > 0".into(),
            ));
        }
        if dqn.epsilon_start < 0.0 || dqn.epsilon_start > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.epsilon_start must be in [0, 1]".into(),
            ));
        }
        if dqn.epsilon_end < 0.0 || dqn.epsilon_end > 1.0 {
            return Err(ConfigError::Validation(
                "dqn.epsilon_end must be in [0, 1]".into(),
            ));
        }
        if dqn.epsilon_end > dqn.epsilon_start {
            return Err(ConfigError::Validation(
                "dqn.epsilon_end must be <= dqn.epsilon_start".into(),
            ));
        }
        if dqn.batch_size == 0 {
            return Err(ConfigError::Validation("dqn.batch_size must be > 0".into()));
        }
        if dqn.replay_capacity < dqn.batch_size {
            return Err(ConfigError::Validation(
                "dqn.replay_capacity must be >= dqn.batch_size".into(),
            ));
        }
        if dqn.target_sync_interval == 0 {
            return Err(ConfigError::Validation(
                "dqn.target_sync_interval must be > 0".into(),
            ));
        }

        let training = &self.training;
        if training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if training.stats_window == 0 {
            return Err(ConfigError::Validation(
                "training.stats_window must be > 0".into(),
            ));
        }
        if training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if training.checkpoint_interval == 0 {
            return Err(ConfigError::Validation(
                "training.checkpoint_interval must be > 0".into(),
            ));
        }
        if training.eval_interval > 0 && training.eval_games == 0 {
            return Err(ConfigError::Validation(
                "training.eval_games must be > 0 when evaluation is enabled".into(),
            ));
        }

        if self.checkpoint.enabled && self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
