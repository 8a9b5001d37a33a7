// ============================================================
// Layer 5 — Predictor
// ============================================================
// Loads an exported model and predicts landmarks for a single
// cropped face image. Runs on the plain Wgpu backend; there is
// no autodiff at inference time.

use anyhow::{anyhow, Context, Result};
use burn::{prelude::*, tensor::TensorData};
use std::path::Path;

use crate::data::dataset::to_chw;
use crate::domain::face_sample::denormalize_marks;
use crate::infra::export::ModelExporter;
use crate::ml::model::{LandmarkNet, LandmarkNetConfig};

type InferBackend = burn::backend::Wgpu;

pub struct Predictor<B: Backend = InferBackend> {
    model:  LandmarkNet<B>,
    config: LandmarkNetConfig,
    device: B::Device,
}

impl Predictor<InferBackend> {
    /// Load the bundle written by the `export` command on the default GPU.
    pub fn from_export(exporter: &ModelExporter) -> Result<Self> {
        Self::from_export_on(exporter, burn::backend::wgpu::WgpuDevice::default())
    }
}

impl<B: Backend> Predictor<B> {
    pub fn from_export_on(exporter: &ModelExporter, device: B::Device) -> Result<Self> {
        let (model, config) = exporter.load::<B>(&device)?;
        Ok(Self { model, config, device })
    }

    pub fn num_marks(&self) -> usize {
        self.config.num_marks
    }

    /// Predict marks in pixel coordinates of the image at `path`.
    pub fn predict_file(&self, path: &Path) -> Result<Vec<[f32; 2]>> {
        let rgb = image::open(path)
            .with_context(|| format!("Cannot open image '{}'", path.display()))?
            .to_rgb8();
        self.predict(&rgb)
    }

    /// Predict marks in pixel coordinates of `rgb`.
    pub fn predict(&self, rgb: &image::RgbImage) -> Result<Vec<[f32; 2]>> {
        let size   = self.config.input_size;
        let pixels = to_chw(rgb, size as u32, 1.0);

        let input = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([1, 3, size, size]);

        output_marks(self.model.forward(input).into_data(), rgb.width(), rgb.height())
    }
}

/// Normalised network output → pixel marks of a `width` x `height` image.
fn output_marks(data: TensorData, width: u32, height: u32) -> Result<Vec<[f32; 2]>> {
    let flat: Vec<f32> = data
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

    tracing::debug!("Predicted {} coordinates", flat.len());
    Ok(denormalize_marks(&flat, width, height))
}
