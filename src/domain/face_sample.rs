// ============================================================
// Layer 3 — Face Sample Domain Type
// ============================================================
// One cropped face image on disk together with its landmark
// annotations. Marks are stored in pixel coordinates of the
// source image; the model works with coordinates normalised to
// [0, 1] so they are independent of the resize applied later.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceSample {
    /// Path to the cropped face image
    pub image_path: PathBuf,

    /// Landmarks as (x, y) pixel positions in the source image
    pub marks: Vec<[f32; 2]>,

    /// Source image width in pixels
    pub width: u32,

    /// Source image height in pixels
    pub height: u32,
}

impl FaceSample {
    pub fn new(image_path: impl Into<PathBuf>, marks: Vec<[f32; 2]>, width: u32, height: u32) -> Self {
        Self { image_path: image_path.into(), marks, width, height }
    }

    pub fn num_marks(&self) -> usize {
        self.marks.len()
    }

    /// Flattened `[x0, y0, x1, y1, ...]` with x divided by the width and
    /// y divided by the height.
    pub fn normalized_marks(&self) -> Vec<f32> {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        self.marks
            .iter()
            .flat_map(|[x, y]| [x / w, y / h])
            .collect()
    }
}

/// Inverse of [`FaceSample::normalized_marks`]: map a flat normalised
/// vector back to pixel positions of a `width` x `height` image.
pub fn denormalize_marks(flat: &[f32], width: u32, height: u32) -> Vec<[f32; 2]> {
    let (w, h) = (width as f32, height as f32);
    flat.chunks_exact(2)
        .map(|p| [p[0] * w, p[1] * h])
        .collect()
}
