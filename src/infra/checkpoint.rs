// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder,
// so an interrupted run can be resumed with --initial-epoch.
//
// Directory layout:
//   checkpoints/
//     landmark_net.mpk     ← weights of the best epoch so far
//     checkpoint.json      ← pointer: { epoch, val_loss, file }
//     train_config.json    ← hyperparameters of the run
//
// Only the best checkpoint (lowest validation loss) is kept; the
// weights file is overwritten each time validation improves.
// `BestCheckpoint` decides when that happens. Like a save-best-only
// callback it starts every run at +inf, so the first epoch of a
// resumed run always writes a checkpoint.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::infra::metrics::EpochMetrics;

const WEIGHTS_STEM: &str = "landmark_net";
const POINTER_FILE: &str = "checkpoint.json";
const CONFIG_FILE:  &str = "train_config.json";

/// Contents of `checkpoint.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Epoch (0-based) whose weights were saved
    pub epoch: usize,

    /// Validation loss that triggered the save
    pub val_loss: f64,

    /// Weights file stem inside the checkpoint directory
    pub file: String,
}

/// Manages saving and loading of model checkpoints in one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Open a checkpoint directory, creating it if it doesn't exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
            tracing::info!("Checkpoint directory created: {}", dir.display());
        }
        Ok(Self { dir })
    }

    fn weights_path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// The most recent checkpoint, if any.
    ///
    /// A pointer whose weights file has gone missing is treated as no
    /// checkpoint at all.
    pub fn latest(&self) -> Result<Option<CheckpointState>> {
        let pointer = self.dir.join(POINTER_FILE);
        if !pointer.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&pointer)
            .with_context(|| format!("Cannot read '{}'", pointer.display()))?;
        let state: CheckpointState = serde_json::from_str(&json)
            .with_context(|| format!("Malformed checkpoint pointer '{}'", pointer.display()))?;

        // CompactRecorder appends the .mpk extension itself
        if !self.weights_path(&state.file).with_extension("mpk").exists() {
            tracing::warn!(
                "Checkpoint pointer names '{}' but no weights were found",
                state.file
            );
            return Ok(None);
        }
        Ok(Some(state))
    }

    /// Save `model` as the current best checkpoint.
    pub fn save<B: Backend, M: Module<B>>(
        &self,
        model:    &M,
        epoch:    usize,
        val_loss: f64,
    ) -> Result<PathBuf> {
        let path = self.weights_path(WEIGHTS_STEM);

        Recorder::<B>::record(&CompactRecorder::new(), model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let state = CheckpointState { epoch, val_loss, file: WEIGHTS_STEM.to_string() };
        let pointer = self.dir.join(POINTER_FILE);
        fs::write(&pointer, serde_json::to_string_pretty(&state)?)
            .with_context(|| format!("Failed to write '{}'", pointer.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(path)
    }

    /// Load the weights described by `state` into `model`.
    pub fn restore<B: Backend, M: Module<B>>(
        &self,
        model:  M,
        state:  &CheckpointState,
        device: &B::Device,
    ) -> Result<M> {
        let path = self.weights_path(&state.file);

        let record = Recorder::<B>::load(&CompactRecorder::new(), path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    /// Restore the latest checkpoint if there is one, otherwise hand the
    /// freshly initialised model back untouched.
    pub fn restore_latest<B: Backend, M: Module<B>>(
        &self,
        model:  M,
        device: &B::Device,
    ) -> Result<(M, Option<CheckpointState>)> {
        match self.latest()? {
            Some(state) => {
                let path = self.weights_path(&state.file);
                tracing::info!("Checkpoint found: {}, restoring..", path.display());
                let model = self.restore(model, &state, device)?;
                tracing::info!("Checkpoint restored: {}", path.display());
                Ok((model, Some(state)))
            }
            None => {
                tracing::info!("Checkpoint not found. Model weights will be initialized randomly.");
                Ok((model, None))
            }
        }
    }

    /// Save the training configuration next to the weights.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration saved by a previous run.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Tracks the lowest validation loss seen during one run.
#[derive(Debug, Clone)]
pub struct BestCheckpoint {
    best: f64,
}

impl BestCheckpoint {
    pub fn new() -> Self {
        Self { best: f64::INFINITY }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Returns true (and records the new best) when the epoch's
    /// validation loss improves. NaN never counts as an improvement.
    pub fn observe(&mut self, m: &EpochMetrics) -> bool {
        if m.is_improvement(self.best) {
            tracing::info!(
                "Epoch {:05}: val_loss improved from {:.5} to {:.5}, saving model",
                m.epoch, self.best, m.val_loss
            );
            self.best = m.val_loss;
            true
        } else {
            tracing::info!("Epoch {:05}: val_loss did not improve from {:.5}", m.epoch, self.best);
            false
        }
    }
}

impl Default for BestCheckpoint {
    fn default() -> Self {
        Self::new()
    }
}
