// ============================================================
// Layer 3 - Core Traits (Capabilities)
// ============================================================
// The pipeline talks to three outside collaborators only
// through these traits:
//
//   StrokeSource - yields raw strokes for one sample file
//                  (IamXmlSource reads IAM-OnDB XML files)
//   Canvas       - accepts polylines and shows/saves them
//                  (PlotlyCanvas writes an HTML plot)
//   StepEngine   - the external sequence model, driven one
//                  time step at a time
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use crate::domain::error::PipelineResult;
use crate::domain::sample::RawSample;

// ─── StrokeSource ─────────────────────────────────────────────────────────────
/// Anything that can turn a stored sample file into strokes.
///
/// `Sync` so one source can be shared across extraction workers.
pub trait StrokeSource: Sync {
    /// Read one sample. Points come back in absolute coordinates,
    /// strokes and points in recording order.
    fn read_sample(&self, path: &Path) -> PipelineResult<RawSample>;

    /// Whether a file under the corpus root is a sample this source reads.
    fn accepts(&self, path: &Path) -> bool;
}

// ─── Canvas ───────────────────────────────────────────────────────────────────
/// A drawing surface for reconstructed handwriting.
///
/// Implementations must keep x and y on the same scale.
pub trait Canvas {
    /// Draw one connected line through the given points.
    fn draw_polyline(&mut self, xs: &[f64], ys: &[f64]);

    /// Finish the drawing (display it or write it out).
    fn show(&mut self) -> anyhow::Result<()>;
}

// ─── StepEngine ───────────────────────────────────────────────────────────────
/// The recurrent model seen from the data side: one call per time index,
/// threading a hidden state and returning a partial loss.
pub trait StepEngine {
    type Hidden;

    fn step(&mut self, input_row: [f32; 3], hidden: Self::Hidden) -> (Self::Hidden, f64);
}
