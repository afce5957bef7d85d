// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches the filesystem or an output format:
//
//   artifact_store.rs - .npy corpus artifacts and cut tensors
//                       (ndarray-npy), written via temp files
//
//   stats_store.rs    - JSON records of the settings and
//                       normalisation stats behind each artifact
//
//   metrics.rs        - 50-bin sample length histogram, logged
//                       and written as CSV
//
//   plot_canvas.rs    - Canvas implementation that writes an
//                       HTML figure with plotly
//
// Reference: Rust Book §7 (Modules)

/// Flat artifact and tensor persistence
pub mod artifact_store;

/// Config and normalisation stats as JSON
pub mod stats_store;

/// Sample length histogram
pub mod metrics;

/// HTML plotting canvas
pub mod plot_canvas;
