// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Narrow capability interfaces the other layers program against.
//
//   - LearningRateControl → anything whose learning rate can be
//                           read and overwritten between epochs
//                           (implemented by ml::optimizer)
//   - SampleSource        → anything that can enumerate labelled
//                           face samples (implemented by
//                           data::loader::MarkedImageLoader)
//
// Keeping these here means the scheduler and the use cases never
// depend on a concrete Burn optimizer or a concrete file layout.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::face_sample::FaceSample;

// ─── LearningRateControl ──────────────────────────────────────────────────────
/// An optimizer-like object exposing a mutable learning rate.
///
/// The epoch scheduler reads the rate before each epoch and writes
/// the resolved value back before the first training step.
pub trait LearningRateControl {
    /// The rate currently configured.
    fn learning_rate(&self) -> f64;

    /// Replace the rate used by subsequent steps.
    fn set_learning_rate(&mut self, rate: f64);
}

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can list labelled face samples.
pub trait SampleSource {
    /// Load every valid sample this source knows about.
    fn load_all(&self) -> Result<Vec<FaceSample>>;
}
