// ============================================================
// Layer 3 - Stroke Sample Types
// ============================================================
// A handwriting recording arrives as an ordered set of strokes,
// each stroke an ordered list of absolute (x, y) pen positions:
//
//   RawSample
//     └── strokes: Vec<Stroke>
//           └── points: Vec<RawPoint>   (absolute, integer)
//
// After encoding, a sample becomes one point matrix with three
// columns per row:
//
//   [dx, dy, pen_flag]
//
// where (dx, dy) is the offset from the previous row and
// pen_flag = 1 marks the last point of a physical stroke.
//
// Many samples are stored back to back in a FlatArtifact:
//
//   points:  [s0 rows..., s1 rows..., s2 rows...]   shape [rows, 3]
//   lengths: [len(s0), len(s1), len(s2)]
//
// Reference: Rust Book §5 (Structs and Methods)

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};

/// Number of columns in an encoded point matrix: dx, dy, pen flag.
pub const POINT_COLUMNS: usize = 3;

/// Column holding the end-of-stroke flag.
pub const FLAG_COLUMN: usize = 2;

/// One absolute pen position as recorded by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: i32,
    pub y: i32,
}

impl RawPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One pen-down to pen-up motion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<RawPoint>,
}

impl Stroke {
    pub fn new(points: Vec<RawPoint>) -> Self {
        Self { points }
    }

    /// Build a stroke from `(x, y)` pairs.
    pub fn from_pairs(pairs: &[(i32, i32)]) -> Self {
        Self {
            points: pairs.iter().map(|&(x, y)| RawPoint::new(x, y)).collect(),
        }
    }
}

/// A complete handwriting recording in stroke order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    /// File name or path, kept for error messages and logs
    pub source: String,

    pub strokes: Vec<Stroke>,
}

impl RawSample {
    pub fn new(source: impl Into<String>, strokes: Vec<Stroke>) -> Self {
        Self {
            source: source.into(),
            strokes,
        }
    }

    /// Total number of points over all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }
}

/// Which partition a sample belongs to. Fixed at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// File stem prefix used for persisted artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test  => "test",
        }
    }

    /// How often extraction progress is logged for this split.
    pub fn progress_every(&self) -> usize {
        match self {
            Split::Train => 500,
            Split::Test  => 100,
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "test"  => Ok(Split::Test),
            other   => Err(format!("unknown split '{other}' (expected train or test)")),
        }
    }
}

// ─── FlatArtifact ─────────────────────────────────────────────────────────────
/// All samples of one split concatenated row-wise, plus per-sample lengths.
///
/// Invariant: `lengths.sum() == points.nrows()` and `points.ncols() == 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatArtifact {
    points:  Array2<i32>,
    lengths: Array1<i64>,
}

impl FlatArtifact {
    /// Wrap an already-concatenated pair, checking the shape invariants.
    pub fn new(points: Array2<i32>, lengths: Array1<i64>) -> PipelineResult<Self> {
        if points.ncols() != POINT_COLUMNS {
            return Err(PipelineError::CorpusIo(format!(
                "point matrix has {} columns, expected {}",
                points.ncols(),
                POINT_COLUMNS
            )));
        }
        if let Some(bad) = lengths.iter().find(|&&l| l < 0) {
            return Err(PipelineError::CorpusIo(format!(
                "negative sample length {bad} in length index"
            )));
        }
        let total: i64 = lengths.sum();
        if total as usize != points.nrows() {
            return Err(PipelineError::CorpusIo(format!(
                "length index sums to {} but point matrix has {} rows",
                total,
                points.nrows()
            )));
        }
        Ok(Self { points, lengths })
    }

    /// Concatenate encoded samples in the given order.
    pub fn from_samples(samples: &[Array2<i32>]) -> PipelineResult<Self> {
        let total_rows: usize = samples.iter().map(|s| s.nrows()).sum();
        let mut flat = Vec::with_capacity(total_rows * POINT_COLUMNS);
        for sample in samples {
            flat.extend(sample.iter().copied());
        }
        let points = Array2::from_shape_vec((total_rows, POINT_COLUMNS), flat)
            .map_err(|e| PipelineError::CorpusIo(format!("cannot assemble point matrix: {e}")))?;
        let lengths: Array1<i64> = samples.iter().map(|s| s.nrows() as i64).collect();
        Self::new(points, lengths)
    }

    pub fn points(&self) -> &Array2<i32> {
        &self.points
    }

    pub fn lengths(&self) -> &Array1<i64> {
        &self.lengths
    }

    pub fn sample_count(&self) -> usize {
        self.lengths.len()
    }

    pub fn into_parts(self) -> (Array2<i32>, Array1<i64>) {
        (self.points, self.lengths)
    }
}
