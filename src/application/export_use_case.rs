// ============================================================
// Layer 2 — ExportUseCase
// ============================================================
// Restores the latest checkpoint and writes the inference bundle.
// Exporting random weights is allowed but warned about: it is
// almost always a wrong --checkpoint-dir.

use anyhow::Result;

use crate::application::{session::ModelSession, train_use_case::RunConfig};
use crate::infra::export::ModelExporter;

type ExportBackend = burn::backend::Wgpu;

pub struct ExportUseCase {
    run: RunConfig,
}

impl ExportUseCase {
    pub fn new(run: RunConfig) -> Self {
        Self { run }
    }

    pub fn execute(&self) -> Result<()> {
        let device  = burn::backend::wgpu::WgpuDevice::default();
        let session = ModelSession::<ExportBackend>::open(&self.run, &device)?;

        if session.restored.is_none() {
            tracing::warn!("Model not restored from any checkpoint.");
        }

        ModelExporter::new(&self.run.export_dir).export(&session.model, &session.config)
    }
}
