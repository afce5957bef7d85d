// ============================================================
// Layer 5 - Sequence Model Boundary
// ============================================================
// The pipeline does not own a model. It hands cut tensors to a
// StepEngine (see domain::traits) one time index at a time:
//
//   engine.rs - unrolls an engine over a sample's real rows,
//               threading the hidden state and summing the
//               per-step loss. Padding rows are never fed.
//
// Batched consumers use data::batcher instead and read the
// `lengths` tensor to mask padding themselves.

/// Step-by-step unrolling of a StepEngine over cut samples
pub mod engine;
