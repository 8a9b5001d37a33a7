// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The learning rate schedule lives here because it is a pure
// function of (schedule, epoch, current rate) and has nothing
// to do with any particular framework.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A cropped face image path with its annotated landmarks
pub mod face_sample;

// Epoch-indexed learning rate schedule
pub mod schedule;

// Core abstractions (traits) that other layers implement
pub mod traits;
