// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the file system on behalf of training:
//
//   checkpoint.rs — best-checkpoint weights + pointer file +
//                   saved training config (resume support)
//
//   export.rs     — full-precision inference bundle
//
//   metrics.rs    — per-epoch CSV log in the log directory
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Exported model bundle for inference
pub mod export;

/// Training metrics CSV logger
pub mod metrics;
