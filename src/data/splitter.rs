// ============================================================
// Layer 4 — Validation Subset
// ============================================================
// The validation set is the first `n` samples of the test set.
// Its loss decides which checkpoint is kept, so it has to be the
// same images on every run: no shuffling here.

/// Deterministically take the first `n` samples (or all of them).
pub fn take_validation<T: Clone>(samples: &[T], n: usize) -> Vec<T> {
    let take = n.min(samples.len());

    tracing::debug!("Validation subset: {} of {} samples", take, samples.len());
    samples[..take].to_vec()
}
