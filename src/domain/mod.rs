// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits describing pen-stroke data:
//
//   sample.rs  - raw strokes, encoded point matrices and the
//                flat (points, lengths) artifact pair
//   error.rs   - the pipeline error taxonomy
//   traits.rs  - capabilities the pipeline consumes
//                (StrokeSource, Canvas, StepEngine)
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only data types, invariants and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Raw strokes, encoded samples and flat artifacts
pub mod sample;

/// Typed pipeline errors
pub mod error;

/// Capabilities implemented by other layers
pub mod traits;
