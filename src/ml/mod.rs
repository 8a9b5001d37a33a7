// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn tensor and optimizer code lives here.
//
//   model.rs     — LandmarkNet: conv stages + regression head
//
//   optimizer.rs — wraps a Burn optimizer so its learning rate
//                  can be driven by the epoch scheduler
//
//   trainer.rs   — epoch loop: schedule, train, validate, log,
//                  checkpoint; plus full-set evaluation
//
//   predictor.rs — loads an exported model and predicts marks
//                  for a single image
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Landmark regression network
pub mod model;

/// Optimizer wrapper exposing a mutable learning rate
pub mod optimizer;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference on exported models
pub mod predictor;
