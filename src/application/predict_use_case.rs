// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads the exported bundle and predicts landmarks for one image.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::infra::export::ModelExporter;
use crate::ml::predictor::Predictor;

pub struct PredictUseCase {
    predictor: Predictor,
}

impl PredictUseCase {
    pub fn new(export_dir: impl Into<PathBuf>) -> Result<Self> {
        let predictor = Predictor::from_export(&ModelExporter::new(export_dir))?;
        tracing::info!("Predictor ready ({} marks per face)", predictor.num_marks());
        Ok(Self { predictor })
    }

    /// Marks as (x, y) pixel positions in the given image.
    pub fn predict(&self, image: &Path) -> Result<Vec<[f32; 2]>> {
        let marks = self.predictor.predict_file(image)?;
        tracing::info!("Predicted {} marks for '{}'", marks.len(), image.display());
        Ok(marks)
    }
}
