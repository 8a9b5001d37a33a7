// ============================================================
// Layer 4 — Landmark Batcher
// ============================================================
// Implements Burn's Batcher trait to stack LandmarkItems into
// device tensors.
//
//   Input:  Vec of N LandmarkItems
//   Output: LandmarkBatch
//             images  [N, 3, size, size]
//             targets [N, 2 * num_marks]
//
// Every item already has the same pixel and mark count, so the
// batch is a flat concatenation followed by a reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::LandmarkItem;

#[derive(Debug, Clone)]
pub struct LandmarkBatch<B: Backend> {
    /// Normalised RGB images — shape: [batch_size, 3, size, size]
    pub images: Tensor<B, 4>,

    /// Normalised mark coordinates — shape: [batch_size, 2 * num_marks]
    pub targets: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct LandmarkBatcher<B: Backend> {
    pub device:     B::Device,
    pub input_size: usize,
}

impl<B: Backend> LandmarkBatcher<B> {
    pub fn new(device: B::Device, input_size: usize) -> Self {
        Self { device, input_size }
    }
}

impl<B: Backend> Batcher<LandmarkItem, LandmarkBatch<B>> for LandmarkBatcher<B> {
    fn batch(&self, items: Vec<LandmarkItem>) -> LandmarkBatch<B> {
        let batch_size = items.len();
        let mark_len   = items.first().map(|i| i.marks.len()).unwrap_or(0);

        let pixels: Vec<f32> = items.iter().flat_map(|i| i.pixels.iter().copied()).collect();
        let marks:  Vec<f32> = items.iter().flat_map(|i| i.marks.iter().copied()).collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, 3, self.input_size, self.input_size]);

        let targets = Tensor::<B, 1>::from_floats(marks.as_slice(), &self.device)
            .reshape([batch_size, mark_len]);

        LandmarkBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device  = Default::default();
        let batcher = LandmarkBatcher::<NdArray>::new(device, 2);
        let item = LandmarkItem { pixels: vec![0.5; 12], marks: vec![0.1, 0.2, 0.3, 0.4] };

        let batch = batcher.batch(vec![item.clone(), item]);
        assert_eq!(batch.images.dims(), [2, 3, 2, 2]);
        assert_eq!(batch.targets.dims(), [2, 4]);
    }
}
