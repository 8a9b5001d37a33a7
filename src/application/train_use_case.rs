// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Build model, restore latest checkpoint (session)
//   Step 2: Save config                   (Layer 6 - infra)
//   Step 3: Load test samples, take the validation subset
//   Step 4: Load training samples         (Layer 4 - data)
//   Step 5: Build the learning rate schedule (Layer 3 - domain)
//   Step 6: Run the training loop         (Layer 5 - ml)
//   Step 7: Evaluate on the full test set (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::module::AutodiffModule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::session::ModelSession;
use crate::data::{
    dataset::LandmarkDataset,
    loader::MarkedImageLoader,
    splitter::take_validation,
};
use crate::domain::schedule::{EpochLrScheduler, Schedule};
use crate::domain::traits::SampleSource;
use crate::infra::metrics::MetricsLogger;
use crate::ml::model::LandmarkNetConfig;
use crate::ml::trainer::{evaluate, fit, Callbacks, FitSettings, LoaderSettings};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// (epoch to start, learning rate) overrides applied at epoch start.
pub const LR_SCHEDULE: [(usize, f64); 3] = [
    (1,  0.001),
    (30, 0.0001),
    (50, 0.00001),
];

// ─── Run Configuration ───────────────────────────────────────────────────────
// Paths and model shape shared by every command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub train_dir:      PathBuf,
    pub test_dir:       PathBuf,
    pub checkpoint_dir: PathBuf,
    pub export_dir:     PathBuf,
    pub log_dir:        PathBuf,
    pub batch_size:     usize,
    pub num_workers:    usize,
    pub input_size:     usize,
    pub width:          usize,
    pub num_marks:      usize,
}

impl RunConfig {
    pub fn model_config(&self) -> LandmarkNetConfig {
        LandmarkNetConfig::new()
            .with_num_marks(self.num_marks)
            .with_width(self.width)
            .with_input_size(self.input_size)
    }

    pub fn test_loader(&self) -> MarkedImageLoader {
        MarkedImageLoader::new(&self.test_dir, self.num_marks)
    }

    pub fn train_loader(&self) -> MarkedImageLoader {
        MarkedImageLoader::new(&self.train_dir, self.num_marks)
    }

    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            batch_size:  self.batch_size,
            num_workers: self.num_workers,
            input_size:  self.input_size,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            train_dir:      PathBuf::from("data/wflw_cropped/train"),
            test_dir:       PathBuf::from("data/wflw_cropped/test"),
            checkpoint_dir: PathBuf::from("./checkpoints"),
            export_dir:     PathBuf::from("./exported"),
            log_dir:        PathBuf::from("./logs"),
            batch_size:     32,
            num_workers:    4,
            input_size:     256,
            width:          18,
            num_marks:      98,
        }
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved next to the checkpoints as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    #[serde(flatten)]
    pub run:           RunConfig,
    pub epochs:        usize,
    pub initial_epoch: usize,
    pub learning_rate: f64,
    pub val_samples:   usize,
}

impl TrainConfig {
    /// Reject settings that would make a run save nothing.
    pub fn validate(&self) -> Result<()> {
        if self.val_samples == 0 {
            bail!("--val-samples must be at least 1: best checkpoints are chosen by validation loss");
        }
        if self.run.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        Ok(())
    }

    pub fn fit_settings(&self) -> FitSettings {
        FitSettings {
            initial_epoch: self.initial_epoch,
            epochs:        self.epochs,
            learning_rate: self.learning_rate,
            loader:        self.run.loader_settings(),
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            run:           RunConfig::default(),
            epochs:        60,
            initial_epoch: 0,
            learning_rate: 0.0001,
            val_samples:   320,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg    = &self.config;
        cfg.validate()?;
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        // ── Step 1: Model + checkpoint restore ───────────────────────────────
        let session = ModelSession::<TrainBackend>::open(&cfg.run, &device)?;

        // ── Step 2: Save config ──────────────────────────────────────────────
        if session.restored.is_some() {
            if let Ok(previous) = session.checkpoints.load_config() {
                // Weights do not depend on the input size, so this only warns
                if previous.run.input_size != cfg.run.input_size {
                    tracing::warn!(
                        "Input size changed from {} to {} since the previous run",
                        previous.run.input_size, cfg.run.input_size
                    );
                }
            }
        }
        session.checkpoints.save_config(cfg)?;

        // ── Step 3: Test samples and validation subset ───────────────────────
        let test_samples = cfg.run.test_loader().load_all()?;
        if test_samples.is_empty() {
            bail!("No test samples found in '{}'", cfg.run.test_dir.display());
        }
        let val_samples = take_validation(&test_samples, cfg.val_samples);

        // ── Step 4: Training samples ─────────────────────────────────────────
        let train_samples = cfg.run.train_loader().load_all()?;
        if train_samples.is_empty() {
            bail!("No training samples found in '{}'", cfg.run.train_dir.display());
        }
        tracing::info!(
            "Samples: {} train, {} validation, {} test",
            train_samples.len(),
            val_samples.len(),
            test_samples.len()
        );

        // ── Step 5: Learning rate schedule ───────────────────────────────────
        let scheduler = EpochLrScheduler::new(Schedule::new(LR_SCHEDULE)?);
        for bp in scheduler.schedule().breakpoints() {
            tracing::debug!("Scheduled: epoch {} -> lr {}", bp.epoch, bp.rate);
        }

        // ── Step 6: Training loop ────────────────────────────────────────────
        let size     = cfg.run.input_size as u32;
        let settings = cfg.fit_settings();
        let metrics  = MetricsLogger::new(&cfg.run.log_dir)?;

        let model = fit(
            session.model,
            LandmarkDataset::new(train_samples, size, true),
            LandmarkDataset::new(val_samples, size, false),
            &settings,
            Callbacks {
                scheduler:   &scheduler,
                checkpoints: &session.checkpoints,
                metrics:     &metrics,
            },
            &device,
        )?;

        // ── Step 7: Full evaluation ──────────────────────────────────────────
        let report = evaluate(
            &model.valid(),
            LandmarkDataset::new(test_samples, size, false),
            &settings.loader,
            &device,
        )?;
        println!("Test loss: {:.6}", report.loss);

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schedule_is_valid() {
        let schedule = Schedule::new(LR_SCHEDULE).unwrap();
        assert_eq!(schedule.first_epoch(), 1);
        assert_eq!(schedule.last_epoch(), 50);
    }

    #[test]
    fn test_train_config_json_is_flat() {
        let json = serde_json::to_value(TrainConfig::default()).unwrap();
        assert_eq!(json["epochs"], 60);
        assert_eq!(json["batch_size"], 32);
        assert_eq!(json["num_marks"], 98);
    }

    #[test]
    fn test_fit_settings_follow_config() {
        let cfg = TrainConfig { initial_epoch: 12, ..TrainConfig::default() };
        let s = cfg.fit_settings();
        assert_eq!((s.initial_epoch, s.epochs, s.loader.batch_size), (12, 60, 32));
        assert_eq!(s.learning_rate, 0.0001);
    }

    #[test]
    fn test_validate_rejects_empty_validation_set() {
        assert!(TrainConfig::default().validate().is_ok());

        let cfg = TrainConfig { val_samples: 0, ..TrainConfig::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("--val-samples"));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let run = RunConfig { batch_size: 0, ..RunConfig::default() };
        let cfg = TrainConfig { run, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_config_follows_run() {
        let run = RunConfig { width: 32, num_marks: 68, ..RunConfig::default() };
        let m = run.model_config();
        assert_eq!((m.width, m.num_marks, m.input_size), (32, 68, 256));
    }
}
