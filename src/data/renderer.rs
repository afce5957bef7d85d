// ============================================================
// Layer 4 - Inverse Renderer
// ============================================================
// Takes a delta-encoded sample (raw, or normalised and padded
// from a cut tensor) back to drawable pen strokes:
//
//   1. 2 columns → append a zero flag column;
//      3 columns → round the flag to {0, 1}
//   2. force the last row's flag to 1
//   3. x = x * std_x + mean_x,  y = y * std_y + mean_y
//   4. running sum of (x, y) from row `accumulate_from` onward
//   5. y = -y   (device y grows downward)
//   6. split at flagged rows; each span [begin, end] (end row
//      included) becomes one polyline on the Canvas
//
// The running sum starts at row 2 by default. Starting at row 1
// draws the same picture whenever the denormalised first row is
// (0, 0), i.e. whenever mean_x = mean_y = 0.
//
// Reference: ndarray documentation (ArrayView2, mapv)

use ndarray::{Array2, ArrayView2};

use crate::data::cutter::NormalizationStats;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::FLAG_COLUMN;
use crate::domain::traits::Canvas;

/// First row the cumulative sum is applied to.
pub const DEFAULT_ACCUMULATE_FROM: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseRenderer {
    mean_x: f64,
    mean_y: f64,
    std_x:  f64,
    std_y:  f64,
    accumulate_from: usize,
}

impl Default for InverseRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl InverseRenderer {
    /// No denormalisation: mean 0, std 1.
    pub fn new() -> Self {
        Self {
            mean_x: 0.0,
            mean_y: 0.0,
            std_x:  1.0,
            std_y:  1.0,
            accumulate_from: DEFAULT_ACCUMULATE_FROM,
        }
    }

    pub fn with_denormalization(mut self, mean_x: f64, mean_y: f64, std_x: f64, std_y: f64) -> Self {
        self.mean_x = mean_x;
        self.mean_y = mean_y;
        self.std_x  = std_x;
        self.std_y  = std_y;
        self
    }

    /// Undo the x/y part of a cut's normalisation.
    pub fn with_stats(self, stats: &NormalizationStats) -> Self {
        self.with_denormalization(stats.mean[0], stats.mean[1], stats.std[0], stats.std[1])
    }

    /// Row index the running sum starts at (values below 1 act as 1).
    pub fn with_accumulate_from(mut self, row: usize) -> Self {
        self.accumulate_from = row.max(1);
        self
    }

    /// Steps 1-3: flag column fixed up, x and y back in offset units.
    pub fn denormalize<A>(&self, mat: ArrayView2<'_, A>) -> PipelineResult<Array2<f64>>
    where
        A: Copy + Into<f64>,
    {
        let (rows, cols) = mat.dim();
        if rows == 0 {
            return Err(PipelineError::malformed("render input", "sample has no rows"));
        }
        if cols != 2 && cols != 3 {
            return Err(PipelineError::malformed(
                "render input",
                format!("expected 2 or 3 columns, got {cols}"),
            ));
        }

        let mut out = Array2::<f64>::zeros((rows, 3));
        for (i, row) in mat.rows().into_iter().enumerate() {
            let x: f64 = row[0].into();
            let y: f64 = row[1].into();
            out[[i, 0]] = x * self.std_x + self.mean_x;
            out[[i, 1]] = y * self.std_y + self.mean_y;
            if cols == 3 {
                let flag: f64 = row[FLAG_COLUMN].into();
                out[[i, FLAG_COLUMN]] = if (flag - 0.5).ceil() >= 1.0 { 1.0 } else { 0.0 };
            }
        }
        out[[rows - 1, FLAG_COLUMN]] = 1.0;
        Ok(out)
    }

    /// Steps 1-5: absolute drawing coordinates with the y axis flipped.
    pub fn reconstruct<A>(&self, mat: ArrayView2<'_, A>) -> PipelineResult<Array2<f64>>
    where
        A: Copy + Into<f64>,
    {
        let mut out = self.denormalize(mat)?;
        for i in self.accumulate_from..out.nrows() {
            out[[i, 0]] += out[[i - 1, 0]];
            out[[i, 1]] += out[[i - 1, 1]];
        }
        out.column_mut(1).mapv_inplace(|y| -y);
        Ok(out)
    }

    /// Draw every stroke of the sample on the canvas, then show it.
    pub fn render<A, C>(&self, mat: ArrayView2<'_, A>, canvas: &mut C) -> anyhow::Result<()>
    where
        A: Copy + Into<f64>,
        C: Canvas + ?Sized,
    {
        let abs = self.reconstruct(mat)?;
        let spans = stroke_spans(&abs);
        for &(begin, end) in &spans {
            let xs: Vec<f64> = (begin..=end).map(|i| abs[[i, 0]]).collect();
            let ys: Vec<f64> = (begin..=end).map(|i| abs[[i, 1]]).collect();
            canvas.draw_polyline(&xs, &ys);
        }
        tracing::debug!("Rendered {} strokes from {} rows", spans.len(), abs.nrows());
        canvas.show()
    }
}

/// Inclusive `(begin, end)` row ranges, one per flagged stroke end.
pub fn stroke_spans(mat: &Array2<f64>) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut begin = 0usize;
    for (i, &flag) in mat.column(FLAG_COLUMN).iter().enumerate() {
        if flag != 0.0 {
            spans.push((begin, i));
            begin = i + 1;
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cutter::{CutOptions, CutPadNormalizer};
    use crate::data::extractor::StrokeExtractor;
    use crate::data::indexer::SequenceIndexer;
    use crate::domain::sample::{FlatArtifact, RawSample, Stroke};
    use ndarray::array;

    /// Records every polyline instead of drawing it.
    #[derive(Default)]
    struct RecordingCanvas {
        lines: Vec<(Vec<f64>, Vec<f64>)>,
        shown: bool,
    }

    impl Canvas for RecordingCanvas {
        fn draw_polyline(&mut self, xs: &[f64], ys: &[f64]) {
            self.lines.push((xs.to_vec(), ys.to_vec()));
        }

        fn show(&mut self) -> anyhow::Result<()> {
            self.shown = true;
            Ok(())
        }
    }

    fn sample() -> RawSample {
        RawSample::new(
            "s",
            vec![
                Stroke::from_pairs(&[(10, 20), (11, 20), (12, 25)]),
                Stroke::from_pairs(&[(15, 30), (15, 31)]),
            ],
        )
    }

    /// Absolute points relative to the first, y flipped.
    fn expected_abs(raw: &RawSample) -> Vec<(f64, f64)> {
        let first = raw.strokes[0].points[0];
        raw.strokes
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| (f64::from(p.x - first.x), -f64::from(p.y - first.y)))
            .collect()
    }

    #[test]
    fn test_round_trip_restores_absolute_coordinates() {
        let raw = sample();
        let encoded = StrokeExtractor::new(300).unwrap().extract(&raw).unwrap();

        for from in [1, 2] {
            let abs = InverseRenderer::new()
                .with_accumulate_from(from)
                .reconstruct(encoded.view())
                .unwrap();
            let got: Vec<(f64, f64)> = abs.rows().into_iter().map(|r| (r[0], r[1])).collect();
            assert_eq!(got, expected_abs(&raw), "accumulate_from = {from}");
        }
    }

    #[test]
    fn test_round_trip_follows_clipped_path() {
        // Second step jumps (500, -400), beyond the clip bound of 300
        let raw = RawSample::new(
            "jump",
            vec![Stroke::from_pairs(&[(0, 0), (500, -400), (501, -400)])],
        );
        let encoded = StrokeExtractor::new(300).unwrap().extract(&raw).unwrap();

        for from in [1, 2] {
            let abs = InverseRenderer::new()
                .with_accumulate_from(from)
                .reconstruct(encoded.view())
                .unwrap();
            let got: Vec<(f64, f64)> = abs.rows().into_iter().map(|r| (r[0], r[1])).collect();
            assert_eq!(got, vec![(0.0, 0.0), (300.0, 300.0), (301.0, 300.0)], "accumulate_from = {from}");
        }
    }

    #[test]
    fn test_accumulation_start_differs_when_first_row_nonzero() {
        // Denormalised first row becomes (mean_x, mean_y) = (5, 0)
        let mat = array![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]];
        let from2 = InverseRenderer::new()
            .with_denormalization(5.0, 0.0, 1.0, 1.0)
            .reconstruct(mat.view())
            .unwrap();
        let from1 = InverseRenderer::new()
            .with_denormalization(5.0, 0.0, 1.0, 1.0)
            .with_accumulate_from(1)
            .reconstruct(mat.view())
            .unwrap();

        assert_eq!(from2.column(0).to_vec(), vec![5.0, 6.0, 12.0]);
        assert_eq!(from1.column(0).to_vec(), vec![5.0, 11.0, 17.0]);
    }

    #[test]
    fn test_two_column_input_gets_flag_column() {
        let mat = array![[0i32, 0], [2, 2]];
        let abs = InverseRenderer::new().reconstruct(mat.view()).unwrap();
        assert_eq!(abs.ncols(), 3);
        assert_eq!(abs.column(FLAG_COLUMN).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_flag_rounding_and_forced_end() {
        let mat = array![[0.0f32, 0.0, 0.9], [0.0, 0.0, 0.2], [0.0, 0.0, 0.5], [0.0, 0.0, 0.0]];
        let out = InverseRenderer::new().denormalize(mat.view()).unwrap();
        assert_eq!(out.column(FLAG_COLUMN).to_vec(), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_denormalize_inverts_cut_normalization() {
        let raw = sample();
        let encoded = StrokeExtractor::new(300).unwrap().extract(&raw).unwrap();
        let corpus  = SequenceIndexer::index(FlatArtifact::from_samples(&[encoded.clone()]).unwrap());
        let options = CutOptions { cut_len: 8, ..CutOptions::default() };
        let (tensor, stats) = CutPadNormalizer::new(options).unwrap().cut(&corpus);

        let real = tensor.unpadded_sample(0).unwrap();
        let back = InverseRenderer::new().with_stats(&stats).denormalize(real.view()).unwrap();
        for (i, row) in encoded.rows().into_iter().enumerate() {
            assert!((back[[i, 0]] - f64::from(row[0])).abs() < 1e-4);
            assert!((back[[i, 1]] - f64::from(row[1])).abs() < 1e-4);
        }
    }

    #[test]
    fn test_render_draws_one_polyline_per_stroke() {
        let encoded = StrokeExtractor::new(300).unwrap().extract(&sample()).unwrap();
        let mut canvas = RecordingCanvas::default();
        InverseRenderer::new().render(encoded.view(), &mut canvas).unwrap();

        assert!(canvas.shown);
        assert_eq!(canvas.lines.len(), 2);
        // Boundary row belongs to the stroke it ends
        assert_eq!(canvas.lines[0].0, vec![0.0, 1.0, 2.0]);
        assert_eq!(canvas.lines[1].0, vec![5.0, 5.0]);
        assert_eq!(canvas.lines[1].1, vec![-10.0, -11.0]);
    }

    #[test]
    fn test_stroke_spans_cover_all_rows() {
        let mat = array![[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        assert_eq!(stroke_spans(&mat), vec![(0, 0), (1, 3)]);
    }

    #[test]
    fn test_empty_input_rejected() {
        let mat = Array2::<f32>::zeros((0, 3));
        assert!(InverseRenderer::new().reconstruct(mat.view()).is_err());
    }
}
