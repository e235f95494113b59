use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::ai::Trainer;
use crate::checkpoint::metadata::{CheckpointMetadata, TrainingState};
use crate::error::CheckpointError;

const METADATA_FILE: &str = "metadata.json";
const TRAINING_STATE_FILE: &str = "training_state.json";
const WEIGHTS_STEM: &str = "value_network";
const LATEST_POINTER: &str = "latest";

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub enabled: bool,
    pub checkpoint_dir: PathBuf,
    pub keep_last_n: usize,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            enabled: false,
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_last_n: 5,
        }
    }
}

/// A checkpoint read back from disk.
#[derive(Debug)]
pub struct CheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub training_state: TrainingState,
}

impl CheckpointData {
    /// Path to hand to [`Trainer::load`].
    pub fn weights_path(&self) -> PathBuf {
        self.path.join(WEIGHTS_STEM)
    }
}

/// Manages saving, loading, listing, and pruning checkpoints.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Self {
        CheckpointManager { config }
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.checkpoint_dir
    }

    /// Write `checkpoint_{episode}` with weights, metadata and training state.
    ///
    /// Everything is written to a `.tmp` directory first, then renamed into place.
    pub fn save(
        &self,
        trainer: &Trainer,
        metadata: &CheckpointMetadata,
        training_state: &TrainingState,
    ) -> Result<PathBuf, CheckpointError> {
        let dir_name = format!("checkpoint_{:07}", metadata.episode);
        let tmp_dir = self.config.checkpoint_dir.join(format!("{}.tmp", dir_name));
        let final_dir = self.config.checkpoint_dir.join(&dir_name);

        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir)?;
        }
        fs::create_dir_all(&tmp_dir)?;

        trainer.save(&tmp_dir.join(WEIGHTS_STEM))?;
        fs::write(
            tmp_dir.join(TRAINING_STATE_FILE),
            serde_json::to_string_pretty(training_state)?,
        )?;
        fs::write(
            tmp_dir.join(METADATA_FILE),
            serde_json::to_string_pretty(metadata)?,
        )?;

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        self.update_latest_pointer(&dir_name)?;
        self.prune_old_checkpoints()?;

        Ok(final_dir)
    }

    /// Read metadata and training state from a checkpoint directory.
    pub fn load(&self, dir: &Path) -> Result<CheckpointData, CheckpointError> {
        if !dir.is_dir() {
            return Err(CheckpointError::DirNotFound(dir.to_path_buf()));
        }
        let metadata = read_json(&dir.join(METADATA_FILE))?;
        let training_state = read_json(&dir.join(TRAINING_STATE_FILE))?;

        Ok(CheckpointData {
            path: dir.to_path_buf(),
            metadata,
            training_state,
        })
    }

    /// Load the checkpoint named by the `latest` pointer.
    pub fn load_latest(&self) -> Result<CheckpointData, CheckpointError> {
        let pointer = self.config.checkpoint_dir.join(LATEST_POINTER);
        if !pointer.is_file() {
            return Err(CheckpointError::NoLatestPointer(
                self.config.checkpoint_dir.clone(),
            ));
        }
        let dir_name = fs::read_to_string(&pointer)?;
        self.load(&self.config.checkpoint_dir.join(dir_name.trim()))
    }

    /// List all checkpoints sorted by episode (ascending).
    pub fn list_checkpoints(&self) -> Result<Vec<(PathBuf, CheckpointMetadata)>, CheckpointError> {
        let mut results = Vec::new();
        if !self.config.checkpoint_dir.is_dir() {
            return Ok(results);
        }
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !name_str.starts_with("checkpoint_") || name_str.ends_with(".tmp") {
                continue;
            }
            let meta_path = path.join(METADATA_FILE);
            if meta_path.exists() {
                let metadata: CheckpointMetadata = read_json(&meta_path)?;
                results.push((path, metadata));
            }
        }
        results.sort_by_key(|(_, m)| m.episode);
        Ok(results)
    }

    /// Keep only the newest `keep_last_n` checkpoints.
    fn prune_old_checkpoints(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        let excess = checkpoints.len().saturating_sub(self.config.keep_last_n);
        for (path, _) in checkpoints.iter().take(excess) {
            debug!("Pruning checkpoint {}", path.display());
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    /// Point `latest` at `dir_name`. Written as a plain file and renamed into place.
    fn update_latest_pointer(&self, dir_name: &str) -> Result<(), CheckpointError> {
        let pointer = self.config.checkpoint_dir.join(LATEST_POINTER);
        let tmp = self.config.checkpoint_dir.join(format!("{LATEST_POINTER}.tmp"));
        fs::write(&tmp, dir_name)?;
        fs::rename(&tmp, &pointer)?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CheckpointError> {
    let json = fs::read_to_string(path).map_err(|e| CheckpointError::MetadataRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| CheckpointError::MetadataParse {
        path: path.to_path_buf(),
        source: e,
    })
}
