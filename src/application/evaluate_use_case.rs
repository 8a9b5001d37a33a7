// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Restores the latest checkpoint and reports the loss on the
// full test set without training.

use anyhow::{bail, Result};

use crate::application::{session::ModelSession, train_use_case::RunConfig};
use crate::data::dataset::LandmarkDataset;
use crate::domain::traits::SampleSource;
use crate::ml::trainer::{evaluate, Evaluation};

type EvalBackend = burn::backend::Wgpu;

pub struct EvaluateUseCase {
    run: RunConfig,
}

impl EvaluateUseCase {
    pub fn new(run: RunConfig) -> Self {
        Self { run }
    }

    pub fn execute(&self) -> Result<Evaluation> {
        let device  = burn::backend::wgpu::WgpuDevice::default();
        let session = ModelSession::<EvalBackend>::open(&self.run, &device)?;

        let samples = self.run.test_loader().load_all()?;
        if samples.is_empty() {
            bail!("No test samples found in '{}'", self.run.test_dir.display());
        }

        let dataset = LandmarkDataset::new(samples, self.run.input_size as u32, false);
        evaluate(&session.model, dataset, &self.run.loader_settings(), &device)
    }
}
