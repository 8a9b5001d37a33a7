// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal per use case.
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// Model construction + checkpoint restore shared by the use cases
pub mod session;

// Full training run
pub mod train_use_case;

// Test-set evaluation of the restored model
pub mod evaluate_use_case;

// Inference bundle export of the restored model
pub mod export_use_case;

// Landmark prediction with an exported model
pub mod predict_use_case;
