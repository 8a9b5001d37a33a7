// ============================================================
// Layer 4 — Marked Image Loader
// ============================================================
// Scans a directory of cropped face images. Every image is
// expected to have a sibling JSON file with the same stem that
// holds its landmarks as an array of [x, y] pixel positions:
//
//   wflw_cropped/train/
//     0001.jpg
//     0001.json      ← [[x0, y0], [x1, y1], ... ]
//     0002.png
//     0002.json
//
// Only the image header is read here (for width and height);
// pixel decoding happens lazily in the dataset so the loader
// stays cheap even for thousands of images.
//
// Reference: Rust Book §8 (Collections)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::face_sample::FaceSample;
use crate::domain::traits::SampleSource;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Loads every (image, marks) pair from a directory.
/// Implements the SampleSource trait from Layer 3.
pub struct MarkedImageLoader {
    /// Directory containing images and their mark files
    dir: PathBuf,

    /// Number of landmarks each mark file must contain
    num_marks: usize,
}

impl MarkedImageLoader {
    pub fn new(dir: impl Into<PathBuf>, num_marks: usize) -> Self {
        Self { dir: dir.into(), num_marks }
    }
}

impl SampleSource for MarkedImageLoader {
    fn load_all(&self) -> Result<Vec<FaceSample>> {
        // Missing directory → empty set; the caller decides whether that is fatal
        if !self.dir.exists() {
            tracing::warn!(
                "Sample directory '{}' does not exist — returning no samples",
                self.dir.display()
            );
            return Ok(Vec::new());
        }

        let mut samples = Vec::new();

        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let path = entry?.path();
            if !is_image(&path) {
                continue;
            }

            match load_single_sample(&path, self.num_marks) {
                Ok(sample) => samples.push(sample),
                // One bad pair should not abort a whole dataset scan
                Err(e) => tracing::warn!("Skipping '{}': {:#}", path.display(), e),
            }
        }

        // read_dir order is platform dependent
        samples.sort_by(|a, b| a.image_path.cmp(&b.image_path));

        tracing::info!(
            "Loaded {} marked images from '{}'",
            samples.len(),
            self.dir.display()
        );
        Ok(samples)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read the mark file next to `image_path` and the image's dimensions.
fn load_single_sample(image_path: &Path, num_marks: usize) -> Result<FaceSample> {
    let mark_path = image_path.with_extension("json");
    let json = fs::read_to_string(&mark_path)
        .with_context(|| format!("Cannot read marks '{}'", mark_path.display()))?;

    let marks: Vec<[f32; 2]> = serde_json::from_str(&json)
        .with_context(|| format!("Malformed marks in '{}'", mark_path.display()))?;

    if marks.len() != num_marks {
        bail!("expected {} marks, found {}", num_marks, marks.len());
    }

    let (width, height) = image::image_dimensions(image_path)
        .with_context(|| format!("Cannot read image header '{}'", image_path.display()))?;

    let sample = FaceSample::new(image_path, marks, width, height);
    tracing::debug!("Loaded: {} ({}x{}, {} marks)", image_path.display(), width, height, sample.num_marks());
    Ok(sample)
}
