// ============================================================
// Layer 6 — Model Export
// ============================================================
// Writes a self-contained inference bundle:
//
//   exported/
//     landmark_net.mpk     ← full-precision weights
//     model_config.json    ← LandmarkNetConfig used to rebuild
//                            the network before loading weights
//
// Unlike checkpoints, the bundle is written at full precision and
// carries its own architecture config, so `predict` never needs
// the training directories.

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::ml::model::{LandmarkNet, LandmarkNetConfig};

const WEIGHTS_STEM: &str = "landmark_net";
const CONFIG_FILE:  &str = "model_config.json";

type ExportRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

pub struct ModelExporter {
    dir: PathBuf,
}

impl ModelExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write weights and config into the export directory.
    pub fn export<B: Backend>(&self, model: &LandmarkNet<B>, cfg: &LandmarkNetConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create export directory '{}'", self.dir.display()))?;

        let weights = self.dir.join(WEIGHTS_STEM);
        Recorder::<B>::record(&ExportRecorder::new(), model.clone().into_record(), weights.clone())
            .with_context(|| format!("Failed to export weights to '{}'", weights.display()))?;

        let config_path = self.dir.join(CONFIG_FILE);
        fs::write(&config_path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write '{}'", config_path.display()))?;

        tracing::info!("Model saved at: {}", self.dir.display());
        Ok(())
    }

    /// Rebuild the exported network on `device`.
    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<(LandmarkNet<B>, LandmarkNetConfig)> {
        let config_path = self.dir.join(CONFIG_FILE);
        if !config_path.exists() {
            bail!(
                "No exported model in '{}'. Run the `export` command first.",
                self.dir.display()
            );
        }

        let json = fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read '{}'", config_path.display()))?;
        let cfg: LandmarkNetConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed model config '{}'", config_path.display()))?;

        let weights = self.dir.join(WEIGHTS_STEM);
        let record = Recorder::<B>::load(&ExportRecorder::new(), weights.clone(), device)
            .with_context(|| format!("Cannot load exported weights '{}'", weights.display()))?;

        let model = cfg.init::<B>(device).load_record(record);
        tracing::info!("Exported model loaded from '{}'", self.dir.display());
        Ok((model, cfg))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_export_then_load_restores_config_and_outputs() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg = LandmarkNetConfig::new()
            .with_num_marks(3)
            .with_width(2)
            .with_input_size(16)
            .with_num_stages(1);
        let model: LandmarkNet<NdArray> = cfg.init(&device);

        let exporter = ModelExporter::new(dir.path());
        exporter.export(&model, &cfg).unwrap();
        let (loaded, loaded_cfg) = exporter.load::<NdArray>(&device).unwrap();

        assert_eq!(loaded_cfg.num_marks, 3);
        assert_eq!(loaded_cfg.input_size, 16);

        let images = Tensor::<NdArray, 4>::ones([1, 3, 16, 16], &device);
        let a: Vec<f32> = model.forward(images.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = loaded.forward(images).into_data().to_vec().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_without_export_fails() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ModelExporter::new(dir.path().join("missing"));
        let err = exporter.load::<NdArray>(&Default::default()).unwrap_err();
        assert!(err.to_string().contains("No exported model"));
    }
}
