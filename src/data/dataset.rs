// ============================================================
// Layer 4 — Landmark Dataset
// ============================================================
// Implements Burn's Dataset trait over FaceSamples. Pixels are
// decoded on demand in `get`, which the DataLoader calls from its
// worker threads, so decoding runs in parallel with training.
//
// Each item is:
//   pixels — CHW f32 in [0, 1], shape [3, size, size] flattened
//   marks  — [x0, y0, x1, y1, ...] normalised to [0, 1]

use burn::data::dataset::Dataset;
use image::imageops::FilterType;
use rand::Rng;

use crate::domain::face_sample::FaceSample;

/// Brightness jitter range applied to training images.
const BRIGHTNESS_RANGE: std::ops::Range<f32> = 0.8..1.2;

#[derive(Debug, Clone)]
pub struct LandmarkItem {
    pub pixels: Vec<f32>,
    pub marks:  Vec<f32>,
}

pub struct LandmarkDataset {
    samples:    Vec<FaceSample>,
    input_size: u32,
    augment:    bool,
}

impl LandmarkDataset {
    /// `augment` enables brightness jitter; use it for the training split only.
    pub fn new(samples: Vec<FaceSample>, input_size: u32, augment: bool) -> Self {
        Self { samples, input_size, augment }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<LandmarkItem> for LandmarkDataset {
    fn get(&self, index: usize) -> Option<LandmarkItem> {
        let sample = self.samples.get(index)?;
        let brightness = if self.augment {
            rand::thread_rng().gen_range(BRIGHTNESS_RANGE)
        } else {
            1.0
        };

        let pixels = match decode_pixels(sample, self.input_size, brightness) {
            Ok(pixels) => pixels,
            // Returning None would end the epoch early, so keep the batch shape
            Err(e) => {
                tracing::warn!("Cannot decode '{}': {e}", sample.image_path.display());
                vec![0.0; pixel_count(self.input_size)]
            }
        };

        Some(LandmarkItem { pixels, marks: sample.normalized_marks() })
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

fn pixel_count(input_size: u32) -> usize {
    3 * (input_size as usize) * (input_size as usize)
}

/// Decode, resize to `input_size` square and lay out as planar RGB.
pub fn decode_pixels(
    sample:     &FaceSample,
    input_size: u32,
    brightness: f32,
) -> image::ImageResult<Vec<f32>> {
    let rgb = image::open(&sample.image_path)?.to_rgb8();
    Ok(to_chw(&rgb, input_size, brightness))
}

/// Resize and convert an RGB image to CHW floats in [0, 1].
pub fn to_chw(rgb: &image::RgbImage, input_size: u32, brightness: f32) -> Vec<f32> {
    let resized = image::imageops::resize(rgb, input_size, input_size, FilterType::Triangle);
    let plane = (input_size as usize) * (input_size as usize);

    let mut out = vec![0.0f32; 3 * plane];
    for (i, pixel) in resized.pixels().enumerate() {
        for c in 0..3 {
            out[c * plane + i] = (pixel[c] as f32 / 255.0 * brightness).clamp(0.0, 1.0);
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_chw_layout_and_range() {
        let mut img = image::RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 51]));
        img.put_pixel(1, 0, image::Rgb([255, 0, 51]));
        img.put_pixel(0, 1, image::Rgb([255, 0, 51]));
        img.put_pixel(1, 1, image::Rgb([255, 0, 51]));

        let out = to_chw(&img, 2, 1.0);
        assert_eq!(out.len(), 12);
        assert!(out[0..4].iter().all(|&v| v == 1.0));
        assert!(out[4..8].iter().all(|&v| v == 0.0));
        assert!(out[8..12].iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_brightness_is_clamped() {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 128, 0]));
        let out = to_chw(&img, 1, 1.2);
        assert_eq!(out[0], 1.0);
        assert!(out[1] > 128.0 / 255.0);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_unreadable_image_yields_zeroed_item() {
        let sample = FaceSample::new("/nonexistent/face.png", vec![[2.0, 4.0]], 4, 8);
        let ds = LandmarkDataset::new(vec![sample], 4, false);

        let item = ds.get(0).unwrap();
        assert_eq!(item.pixels, vec![0.0; 48]);
        assert_eq!(item.marks, vec![0.5, 0.5]);
        assert!(ds.get(1).is_none());
        assert_eq!(ds.len(), 1);
    }
}
