// ============================================================
// Layer 2 — Model Session
// ============================================================
// The start-up sequence shared by train, evaluate and export:
//
//   1. build the network from the run's hyperparameters
//   2. open (or create) the checkpoint directory
//   3. restore the latest checkpoint, if there is one
//
// A session on a fresh directory simply carries randomly
// initialised weights and `restored == None`. A checkpoint saved
// with a different width, mark count or depth is an error.

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::application::train_use_case::RunConfig;
use crate::infra::checkpoint::{CheckpointManager, CheckpointState};
use crate::ml::model::{LandmarkNet, LandmarkNetConfig};

pub struct ModelSession<B: Backend> {
    pub model:       LandmarkNet<B>,
    pub config:      LandmarkNetConfig,
    pub checkpoints: CheckpointManager,
    pub restored:    Option<CheckpointState>,
}

impl<B: Backend> ModelSession<B> {
    pub fn open(run: &RunConfig, device: &B::Device) -> Result<Self> {
        let config = run.model_config();
        let model: LandmarkNet<B> = config.init(device);
        tracing::info!(
            "Model ready: input={}x{}, width={}, marks={}",
            config.input_size, config.input_size, config.width, config.num_marks
        );

        let checkpoints = CheckpointManager::open(&run.checkpoint_dir)?;
        let (model, restored) = checkpoints.restore_latest::<B, _>(model, device)?;

        if restored.is_some() {
            if let Some(mismatch) = config.shape_mismatch(&model) {
                bail!(
                    "Checkpoint in '{}' does not fit the configured model: it has {}. \
                     Pass matching --width/--num-marks or use another --checkpoint-dir.",
                    run.checkpoint_dir.display(),
                    mismatch
                );
            }
        }

        Ok(Self { model, config, checkpoints, restored })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn run_in(dir: &std::path::Path, width: usize, num_marks: usize) -> RunConfig {
        RunConfig {
            checkpoint_dir: dir.join("ckpt"),
            input_size: 32,
            width,
            num_marks,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_fresh_directory_starts_unrestored() {
        let dir = tempfile::tempdir().unwrap();
        let session = ModelSession::<NdArray>::open(&run_in(dir.path(), 2, 2), &Default::default()).unwrap();
        assert!(session.restored.is_none());
    }

    #[test]
    fn test_matching_checkpoint_is_restored() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let run    = run_in(dir.path(), 2, 2);

        let first = ModelSession::<NdArray>::open(&run, &device).unwrap();
        first.checkpoints.save::<NdArray, _>(&first.model, 4, 0.5).unwrap();

        let second = ModelSession::<NdArray>::open(&run, &device).unwrap();
        assert_eq!(second.restored.map(|s| s.epoch), Some(4));
    }

    #[test]
    fn test_checkpoint_with_other_shape_is_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();

        let saved = ModelSession::<NdArray>::open(&run_in(dir.path(), 2, 2), &device).unwrap();
        saved.checkpoints.save::<NdArray, _>(&saved.model, 0, 0.5).unwrap();

        let err = ModelSession::<NdArray>::open(&run_in(dir.path(), 4, 3), &device)
            .err()
            .unwrap();
        assert!(err.to_string().contains("does not fit the configured model"));

        let err = ModelSession::<NdArray>::open(&run_in(dir.path(), 2, 3), &device)
            .err()
            .unwrap();
        assert!(err.to_string().contains("2 marks (configured 3)"));
    }
}
