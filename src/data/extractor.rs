// ============================================================
// Layer 4 - Stroke Extractor
// ============================================================
// Turns one RawSample (a set of strokes in absolute device
// coordinates) into a single delta-encoded point matrix.
//
// Steps:
//   1. Concatenate every stroke's points, third column = 0
//   2. Set the third column of each stroke's last point to 1
//   3. Replace (x, y) of row i > 0 with the offset from row i-1;
//      row 0 becomes (0, 0)
//   4. Clip both offset columns to [-max_dist, max_dist]
//
// Example (two strokes):
//   A = (0,0) (1,0) (2,0)     B = (2,1) (2,2)
//   →  (0,0,0) (1,0,0) (1,0,1) (0,1,0) (0,1,1)
//
// Reference: Rust Book §8 (Vectors), ndarray documentation

use ndarray::Array2;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::{RawSample, FLAG_COLUMN, POINT_COLUMNS};

/// Default clip bound for per-step offsets.
pub const DEFAULT_MAX_DIST: i32 = 300;

pub struct StrokeExtractor {
    /// Symmetric clip bound for dx and dy
    max_dist: i32,

    /// Resample points between stroke endpoints (never implemented)
    interpolate: bool,
}

impl StrokeExtractor {
    /// Create an extractor clipping offsets to `[-max_dist, max_dist]`.
    pub fn new(max_dist: i32) -> PipelineResult<Self> {
        if max_dist <= 0 {
            return Err(PipelineError::Configuration(format!(
                "max_dist must be positive, got {max_dist}"
            )));
        }
        Ok(Self { max_dist, interpolate: false })
    }

    /// Request interpolation between stroke points. Extraction then always
    /// fails with `UnsupportedFeature`.
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn max_dist(&self) -> i32 {
        self.max_dist
    }

    /// Encode one sample into a `[points, 3]` matrix of (dx, dy, pen_flag).
    pub fn extract(&self, sample: &RawSample) -> PipelineResult<Array2<i32>> {
        if self.interpolate {
            return Err(PipelineError::UnsupportedFeature(
                "interpolation between stroke points is not implemented".to_string(),
            ));
        }
        if sample.strokes.is_empty() {
            return Err(PipelineError::malformed(&sample.source, "sample has no strokes"));
        }
        if let Some(idx) = sample.strokes.iter().position(|s| s.points.is_empty()) {
            return Err(PipelineError::malformed(
                &sample.source,
                format!("stroke {idx} has no points"),
            ));
        }

        // ── Absolute matrix with end-of-stroke flags ─────────────────────────
        let rows    = sample.point_count();
        let mut mat = Array2::<i32>::zeros((rows, POINT_COLUMNS));
        let mut row = 0usize;
        for stroke in &sample.strokes {
            for point in &stroke.points {
                mat[[row, 0]] = point.x;
                mat[[row, 1]] = point.y;
                row += 1;
            }
            mat[[row - 1, FLAG_COLUMN]] = 1;
        }

        // ── Delta-encode and clip ─────────────────────────────────────────────
        // Walk backwards so each row still sees its absolute predecessor.
        let bound = i64::from(self.max_dist);
        for i in (1..rows).rev() {
            for col in 0..2 {
                let delta = i64::from(mat[[i, col]]) - i64::from(mat[[i - 1, col]]);
                mat[[i, col]] = delta.clamp(-bound, bound) as i32;
            }
        }
        mat[[0, 0]] = 0;
        mat[[0, 1]] = 0;

        Ok(mat)
    }
}
