// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a directory of marked face crops to device-ready tensor
// batches:
//
//   image + .json mark files
//       │
//       ▼
//   MarkedImageLoader → lists FaceSamples (header + marks only)
//       │
//       ▼
//   take_validation   → deterministic validation subset
//       │
//       ▼
//   LandmarkDataset   → implements Burn's Dataset trait,
//       │               decodes and resizes on demand
//       ▼
//   LandmarkBatcher   → stacks items into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Scans a directory for images with sibling mark files
pub mod loader;

/// Implements Burn's Dataset trait for face samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Takes the fixed validation subset from the test samples
pub mod splitter;
