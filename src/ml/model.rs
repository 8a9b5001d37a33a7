// ============================================================
// Layer 5 — Landmark Regression Network
// ============================================================
// A compact convolutional regressor:
//
//   image [N, 3, S, S]
//     → stem      conv 3x3 / 2  (3 → width)
//     → stages    conv 3x3 / 2  (channels double each stage)
//     → pool      adaptive average pool to 1x1
//     → head      linear → [N, 2 * num_marks]
//
// Every conv is followed by batch norm and ReLU. The head
// predicts (x, y) for each mark, normalised to [0, 1].
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct LandmarkNetConfig {
    /// Number of facial landmarks to regress
    #[config(default = 98)]
    pub num_marks: usize,

    /// Channel count of the stem; doubled by every stage
    #[config(default = 18)]
    pub width: usize,

    /// Side length of the square input image
    #[config(default = 256)]
    pub input_size: usize,

    /// Number of stride-2 stages after the stem
    #[config(default = 4)]
    pub num_stages: usize,
}

impl LandmarkNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LandmarkNet<B> {
        let stem = ConvBlock::new(3, self.width, device);
        let stages = (0..self.num_stages)
            .map(|i| {
                let channels = self.width << i;
                ConvBlock::new(channels, channels * 2, device)
            })
            .collect();
        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let head = LinearConfig::new(self.feature_channels(), self.output_len()).init(device);

        LandmarkNet { stem, stages, pool, head }
    }

    /// Channels entering the head.
    pub fn feature_channels(&self) -> usize {
        self.width << self.num_stages
    }

    /// Length of one prediction: x and y per mark.
    pub fn output_len(&self) -> usize {
        self.num_marks * 2
    }

    /// Describes how `model`'s tensors differ from what this config builds,
    /// or `None` when they agree. Loading a record never checks shapes, so
    /// weights saved with other flags must be caught here.
    pub fn shape_mismatch<B: Backend>(&self, model: &LandmarkNet<B>) -> Option<String> {
        let stem = model.stem.conv.weight.val().dims();
        if stem[0] != self.width {
            return Some(format!("width {} (configured {})", stem[0], self.width));
        }
        if model.stages.len() != self.num_stages {
            return Some(format!("{} stages (configured {})", model.stages.len(), self.num_stages));
        }
        // Linear weights are [d_input, d_output]
        let head = model.head.weight.val().dims();
        if head[1] != self.output_len() {
            return Some(format!("{} marks (configured {})", head[1] / 2, self.num_marks));
        }
        if head[0] != self.feature_channels() {
            return Some(format!(
                "{} head inputs (configured {})",
                head[0],
                self.feature_channels()
            ));
        }
        None
    }
}

#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
}

impl<B: Backend> ConvBlock<B> {
    fn new(channels_in: usize, channels_out: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([channels_in, channels_out], [3, 3])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let norm = BatchNormConfig::new(channels_out).init(device);
        Self { conv, norm }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.norm.forward(self.conv.forward(x)))
    }
}

#[derive(Module, Debug)]
pub struct LandmarkNet<B: Backend> {
    pub stem:   ConvBlock<B>,
    pub stages: Vec<ConvBlock<B>>,
    pub pool:   AdaptiveAvgPool2d,
    pub head:   Linear<B>,
}

impl<B: Backend> LandmarkNet<B> {
    /// images: [batch, 3, S, S] → marks: [batch, 2 * num_marks]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = self.stem.forward(images);
        for stage in &self.stages {
            x = stage.forward(x);
        }
        // [batch, C, 1, 1] → [batch, C]
        let features = self.pool.forward(x).flatten::<2>(1, 3);
        self.head.forward(features)
    }

    /// Mean squared error between predicted and target marks.
    pub fn forward_loss(&self, images: Tensor<B, 4>, targets: Tensor<B, 2>) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let output = self.forward(images);
        let loss = MseLoss::new().forward(output.clone(), targets, Reduction::Mean);
        (loss, output)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn tiny_config() -> LandmarkNetConfig {
        LandmarkNetConfig::new()
            .with_num_marks(3)
            .with_width(4)
            .with_input_size(32)
            .with_num_stages(2)
    }

    #[test]
    fn test_defaults_match_reference_network() {
        let cfg = LandmarkNetConfig::new();
        assert_eq!((cfg.input_size, cfg.width, cfg.num_marks), (256, 18, 98));
        assert_eq!(cfg.output_len(), 196);
        assert_eq!(cfg.feature_channels(), 18 * 16);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model: LandmarkNet<NdArray> = tiny_config().init(&device);
        let images = Tensor::<NdArray, 4>::zeros([2, 3, 32, 32], &device);

        assert_eq!(model.forward(images).dims(), [2, 6]);
    }

    #[test]
    fn test_loss_is_a_finite_scalar() {
        let device = Default::default();
        let model: LandmarkNet<NdArray> = tiny_config().init(&device);
        let images  = Tensor::<NdArray, 4>::ones([1, 3, 32, 32], &device);
        let targets = Tensor::<NdArray, 2>::zeros([1, 6], &device);

        let (loss, _) = model.forward_loss(images, targets);
        let value: f64 = loss.into_scalar().elem::<f64>();
        assert!(value.is_finite());
        assert!(value >= 0.0);
    }

    #[test]
    fn test_shape_mismatch_names_the_differing_dimension() {
        let device = Default::default();
        let model: LandmarkNet<NdArray> = tiny_config().init(&device);
        assert_eq!(tiny_config().shape_mismatch(&model), None);

        let more_marks = tiny_config().with_num_marks(5);
        assert_eq!(more_marks.shape_mismatch(&model).as_deref(), Some("3 marks (configured 5)"));

        let wider = tiny_config().with_width(8);
        assert_eq!(wider.shape_mismatch(&model).as_deref(), Some("width 4 (configured 8)"));

        let deeper = tiny_config().with_num_stages(3);
        assert_eq!(deeper.shape_mismatch(&model).as_deref(), Some("2 stages (configured 3)"));
    }
}
