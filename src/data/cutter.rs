// ============================================================
// Layer 4 - Cut / Pad / Normalise
// ============================================================
// Turns an indexed corpus of variable-length samples into one
// fixed-shape, time-major tensor:
//
//   IndexedCorpus (N samples, any length)
//       │  slice at offsets
//       ▼
//   truncate each sample to its first cut_len rows
//       │
//       ▼
//   mean / std of x and y over the truncated rows
//       │   (mask = false: plus one zero row per future pad row)
//       ▼
//   (x - mean) / std, (y - mean) / std    flag untouched
//       │
//       ▼
//   right-pad to cut_len with the pad value in all 3 channels
//       │
//       ▼
//   CutTensor [cut_len, N, 3]
//
// The pad value is mask_value when masking and 0 otherwise.
// Every stage produces a new array; the loaded corpus is never
// modified.
//
// Example with cut_len = 4, mask_value = 9, one sample of 2 rows:
//   rows 0..2 = the (normalised) sample
//   rows 2..4 = (9, 9, 9)

use ndarray::{s, Array2, Array3, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::{FLAG_COLUMN, POINT_COLUMNS};
use crate::data::indexer::IndexedCorpus;

pub const DEFAULT_CUT_LEN: usize = 500;
pub const DEFAULT_MASK_VALUE: f32 = 500.0;

// ─── NormalizationStats ───────────────────────────────────────────────────────
/// Per-channel mean and standard deviation.
///
/// All three channels are measured so the flag rate can be reported,
/// but only x and y are ever rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub mean: [f64; 3],
    pub std:  [f64; 3],
}

impl NormalizationStats {
    /// mean 0, std 1: applying it changes nothing.
    pub fn identity() -> Self {
        Self { mean: [0.0; 3], std: [1.0; 3] }
    }

    /// Population mean/std over `samples`, counting `zero_rows` extra
    /// all-zero rows. A channel with zero spread gets std 1.
    pub fn compute(samples: &[ArrayView2<'_, i32>], zero_rows: usize) -> Self {
        let real_rows: usize = samples.iter().map(|s| s.nrows()).sum();
        let total = real_rows + zero_rows;
        if total == 0 {
            return Self::identity();
        }

        let mut sum = [0.0f64; 3];
        for sample in samples {
            for row in sample.rows() {
                for c in 0..POINT_COLUMNS {
                    sum[c] += f64::from(row[c]);
                }
            }
        }
        let mean = sum.map(|v| v / total as f64);

        let mut sq = [0.0f64; 3];
        for sample in samples {
            for row in sample.rows() {
                for c in 0..POINT_COLUMNS {
                    sq[c] += (f64::from(row[c]) - mean[c]).powi(2);
                }
            }
        }
        for c in 0..POINT_COLUMNS {
            sq[c] += zero_rows as f64 * mean[c].powi(2);
        }

        let std = sq.map(|v| {
            let s = (v / total as f64).sqrt();
            if s > 0.0 { s } else { 1.0 }
        });
        Self { mean, std }
    }

    pub fn normalize_x(&self, x: f64) -> f64 {
        (x - self.mean[0]) / self.std[0]
    }

    pub fn normalize_y(&self, y: f64) -> f64 {
        (y - self.mean[1]) / self.std[1]
    }
}

// ─── CutOptions ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutOptions {
    pub cut_len:    usize,
    pub normalize:  bool,
    pub mask:       bool,
    pub mask_value: f32,
}

impl CutOptions {
    /// Value written to every channel of a padding row.
    pub fn pad_value(&self) -> f32 {
        if self.mask { self.mask_value } else { 0.0 }
    }
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            cut_len:    DEFAULT_CUT_LEN,
            normalize:  true,
            mask:       true,
            mask_value: DEFAULT_MASK_VALUE,
        }
    }
}

// ─── CutTensor ────────────────────────────────────────────────────────────────
/// Time-major `[cut_len, N, 3]` tensor plus each sample's unpadded length.
#[derive(Debug, Clone, PartialEq)]
pub struct CutTensor {
    data:    Array3<f32>,
    lengths: Vec<usize>,
}

impl CutTensor {
    /// Wrap a tensor read back from disk, recovering each true length as
    /// one past the last row that is not entirely `pad_value`. Searching
    /// from the end keeps a real (0, 0, 0) first row when the pad is 0.
    pub fn from_padded(data: Array3<f32>, pad_value: f32) -> PipelineResult<Self> {
        if data.dim().2 != POINT_COLUMNS {
            return Err(PipelineError::CorpusIo(format!(
                "tensor has {} channels, expected {}",
                data.dim().2,
                POINT_COLUMNS
            )));
        }
        let (cut_len, n, _) = data.dim();
        let lengths = (0..n)
            .map(|j| {
                (0..cut_len)
                    .rev()
                    .find(|&t| (0..POINT_COLUMNS).any(|c| data[[t, j, c]] != pad_value))
                    .map_or(0, |t| t + 1)
            })
            .collect();
        Ok(Self { data, lengths })
    }

    /// Wrap a tensor whose true lengths were recorded alongside it.
    pub fn from_parts(data: Array3<f32>, lengths: Vec<usize>) -> PipelineResult<Self> {
        let (cut_len, n, channels) = data.dim();
        if channels != POINT_COLUMNS || lengths.len() != n {
            return Err(PipelineError::CorpusIo(format!(
                "tensor of shape [{cut_len}, {n}, {channels}] does not match {} recorded lengths",
                lengths.len()
            )));
        }
        if let Some(&len) = lengths.iter().find(|&&len| len > cut_len) {
            return Err(PipelineError::CorpusIo(format!(
                "recorded length {len} exceeds cut length {cut_len}"
            )));
        }
        Ok(Self { data, lengths })
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn into_data(self) -> Array3<f32> {
        self.data
    }

    pub fn cut_len(&self) -> usize {
        self.data.dim().0
    }

    pub fn sample_count(&self) -> usize {
        self.data.dim().1
    }

    /// Unpadded length of every sample (at most cut_len).
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// All cut_len rows of sample `index`, padding included.
    pub fn sample(&self, index: usize) -> PipelineResult<ArrayView2<'_, f32>> {
        if index >= self.sample_count() {
            return Err(PipelineError::CorpusIo(format!(
                "sample {index} out of range ({} samples)",
                self.sample_count()
            )));
        }
        Ok(self.data.slice(s![.., index, ..]))
    }

    /// Only the real rows of sample `index`.
    pub fn unpadded_sample(&self, index: usize) -> PipelineResult<Array2<f32>> {
        let full = self.sample(index)?;
        Ok(full.slice(s![..self.lengths[index], ..]).to_owned())
    }
}

// ─── CutPadNormalizer ─────────────────────────────────────────────────────────
pub struct CutPadNormalizer {
    options: CutOptions,
}

impl CutPadNormalizer {
    pub fn new(options: CutOptions) -> PipelineResult<Self> {
        if options.cut_len == 0 {
            return Err(PipelineError::Configuration(
                "cut_len must be greater than zero".to_string(),
            ));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &CutOptions {
        &self.options
    }

    /// Cut, normalise and pad every sample of the corpus.
    pub fn cut(&self, corpus: &IndexedCorpus) -> (CutTensor, NormalizationStats) {
        let opts    = &self.options;
        let cut_len = opts.cut_len;

        // ── Step 1-2: slice at offsets and truncate ──────────────────────────
        let truncated: Vec<ArrayView2<'_, i32>> = corpus
            .samples()
            .into_iter()
            .map(|sample| {
                let keep = sample.nrows().min(cut_len);
                sample.slice_move(s![..keep, ..])
            })
            .collect();
        let kept_rows: usize = truncated.iter().map(|s| s.nrows()).sum();
        let n = truncated.len();

        // ── Step 3: normalisation basis ──────────────────────────────────────
        let stats = if !opts.normalize {
            NormalizationStats::identity()
        } else if opts.mask {
            NormalizationStats::compute(&truncated, 0)
        } else {
            NormalizationStats::compute(&truncated, n * cut_len - kept_rows)
        };

        // ── Step 4-5: normalise, pad, lay out time-major ─────────────────────
        let mut data = Array3::<f32>::from_elem((cut_len, n, POINT_COLUMNS), opts.pad_value());
        let mut lengths = Vec::with_capacity(n);
        for (j, sample) in truncated.iter().enumerate() {
            for (t, row) in sample.rows().into_iter().enumerate() {
                data[[t, j, 0]] = stats.normalize_x(f64::from(row[0])) as f32;
                data[[t, j, 1]] = stats.normalize_y(f64::from(row[1])) as f32;
                data[[t, j, FLAG_COLUMN]] = row[FLAG_COLUMN] as f32;
            }
            lengths.push(sample.nrows());
        }

        tracing::info!(
            "Cut {} samples to {} steps ({} of {} rows real)",
            n,
            cut_len,
            kept_rows,
            n * cut_len
        );
        (CutTensor { data, lengths }, stats)
    }
}

// ─── Mask sentinel check ──────────────────────────────────────────────────────
/// Number of rows whose x AND y both equal `mask_value`.
pub fn count_mask_collisions(points: &Array2<i32>, mask_value: f32) -> usize {
    points
        .rows()
        .into_iter()
        .filter(|row| row[0] as f32 == mask_value && row[1] as f32 == mask_value)
        .count()
}

/// Refuse a mask value that real data can produce.
pub fn check_mask_value(points: &Array2<i32>, mask_value: f32) -> PipelineResult<()> {
    let collisions = count_mask_collisions(points, mask_value);
    if collisions > 0 {
        return Err(PipelineError::Configuration(format!(
            "mask value {mask_value} collides with {collisions} real data rows"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::indexer::SequenceIndexer;
    use crate::domain::sample::FlatArtifact;
    use ndarray::array;

    fn corpus(samples: &[Array2<i32>]) -> IndexedCorpus {
        SequenceIndexer::index(FlatArtifact::from_samples(samples).unwrap())
    }

    fn opts(cut_len: usize, normalize: bool, mask: bool, mask_value: f32) -> CutOptions {
        CutOptions { cut_len, normalize, mask, mask_value }
    }

    #[test]
    fn test_short_sample_padded_with_mask_value() {
        let c = corpus(&[array![[0, 0, 0], [3, 4, 1]]]);
        let cutter = CutPadNormalizer::new(opts(4, false, true, 9.0)).unwrap();
        let (tensor, stats) = cutter.cut(&c);

        assert_eq!(tensor.data().dim(), (4, 1, 3));
        assert_eq!(stats, NormalizationStats::identity());
        assert_eq!(tensor.data().slice(s![1, 0, ..]).to_vec(), vec![3.0, 4.0, 1.0]);
        assert_eq!(tensor.data().slice(s![2, 0, ..]).to_vec(), vec![9.0, 9.0, 9.0]);
        assert_eq!(tensor.data().slice(s![3, 0, ..]).to_vec(), vec![9.0, 9.0, 9.0]);
        assert_eq!(tensor.lengths(), &[2]);
    }

    #[test]
    fn test_shape_for_shorter_equal_longer() {
        let c = corpus(&[
            Array2::zeros((1, 3)),
            Array2::zeros((3, 3)),
            Array2::zeros((7, 3)),
        ]);
        let (tensor, _) = CutPadNormalizer::new(opts(3, true, true, 500.0)).unwrap().cut(&c);
        assert_eq!(tensor.data().dim(), (3, 3, 3));
        assert_eq!(tensor.lengths(), &[1, 3, 3]);
    }

    #[test]
    fn test_exact_length_gets_no_padding() {
        let c = corpus(&[array![[0, 0, 0], [1, 1, 0], [2, 2, 1]]]);
        let (tensor, _) = CutPadNormalizer::new(opts(3, false, true, 500.0)).unwrap().cut(&c);
        assert!(tensor.data().iter().all(|&v| v != 500.0));
    }

    #[test]
    fn test_truncation_keeps_first_rows() {
        let c = corpus(&[array![[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 1]]]);
        let (tensor, _) = CutPadNormalizer::new(opts(2, false, true, 500.0)).unwrap().cut(&c);
        assert_eq!(tensor.data().slice(s![.., 0, 0]).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_masked_stats_ignore_padding() {
        // x values 0 and 2 → mean 1, std 1; y values 0 and 4 → mean 2, std 2
        let c = corpus(&[array![[0, 0, 0], [2, 4, 1]]]);
        let (tensor, stats) = CutPadNormalizer::new(opts(5, true, true, 500.0)).unwrap().cut(&c);

        assert!((stats.mean[0] - 1.0).abs() < 1e-12);
        assert!((stats.std[0] - 1.0).abs() < 1e-12);
        assert!((stats.mean[1] - 2.0).abs() < 1e-12);
        assert!((stats.std[1] - 2.0).abs() < 1e-12);
        assert_eq!(tensor.data().slice(s![0, 0, ..]).to_vec(), vec![-1.0, -1.0, 0.0]);
        assert_eq!(tensor.data().slice(s![1, 0, ..]).to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(tensor.data().slice(s![4, 0, ..]).to_vec(), vec![500.0, 500.0, 500.0]);
    }

    #[test]
    fn test_unmasked_stats_count_zero_padding() {
        // x = [4, 4] plus two zero pad rows → mean 2, std 2
        let c = corpus(&[array![[4, 0, 0], [4, 0, 1]]]);
        let (tensor, stats) = CutPadNormalizer::new(opts(4, true, false, 500.0)).unwrap().cut(&c);

        assert!((stats.mean[0] - 2.0).abs() < 1e-12);
        assert!((stats.std[0] - 2.0).abs() < 1e-12);
        // Pad rows are 0, not the requested mask value
        assert_eq!(tensor.data().slice(s![3, 0, ..]).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(tensor.data()[[0, 0, 0]], 1.0);
    }

    #[test]
    fn test_flag_channel_never_normalized() {
        let c = corpus(&[array![[0, 5, 0], [10, 7, 1]], array![[0, 0, 1]]]);
        let (tensor, _) = CutPadNormalizer::new(opts(3, true, true, 500.0)).unwrap().cut(&c);
        for &v in tensor.data().slice(s![.., .., FLAG_COLUMN]).iter() {
            assert!(v == 0.0 || v == 1.0 || v == 500.0);
        }
    }

    #[test]
    fn test_input_corpus_unchanged() {
        let c = corpus(&[array![[0, 0, 0], [2, 4, 1]]]);
        let before = c.clone();
        let _ = CutPadNormalizer::new(opts(5, true, true, 500.0)).unwrap().cut(&c);
        assert_eq!(c, before);
    }

    #[test]
    fn test_zero_cut_len_rejected() {
        let err = CutPadNormalizer::new(opts(0, true, true, 500.0)).err().unwrap();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_empty_corpus_gives_empty_batch_axis() {
        let c = corpus(&[]);
        let (tensor, stats) = CutPadNormalizer::new(opts(4, true, false, 0.0)).unwrap().cut(&c);
        assert_eq!(tensor.data().dim(), (4, 0, 3));
        assert_eq!(stats, NormalizationStats::identity());
    }

    #[test]
    fn test_from_padded_recovers_lengths() {
        let c = corpus(&[array![[0, 0, 0], [3, 4, 1]], array![[1, 1, 1]]]);
        let (tensor, _) = CutPadNormalizer::new(opts(3, false, true, 500.0)).unwrap().cut(&c);
        let reloaded = CutTensor::from_padded(tensor.data().clone(), 500.0).unwrap();
        assert_eq!(reloaded.lengths(), &[2, 1]);
        assert_eq!(reloaded.unpadded_sample(0).unwrap().nrows(), 2);
    }

    #[test]
    fn test_from_padded_with_zero_pad_keeps_first_row() {
        let c = corpus(&[array![[0, 0, 0], [3, 4, 1]], array![[0, 0, 0], [0, 2, 0], [1, 0, 1]]]);
        let (tensor, _) = CutPadNormalizer::new(opts(5, false, false, 0.0)).unwrap().cut(&c);
        let reloaded = CutTensor::from_padded(tensor.data().clone(), 0.0).unwrap();
        assert_eq!(reloaded.lengths(), &[2, 3]);
        assert_eq!(reloaded.unpadded_sample(1).unwrap().row(0).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_parts_validates_lengths() {
        let data = Array3::<f32>::zeros((3, 2, 3));
        assert!(CutTensor::from_parts(data.clone(), vec![3, 1]).is_ok());
        assert!(CutTensor::from_parts(data.clone(), vec![3]).is_err());
        assert!(CutTensor::from_parts(data, vec![4, 1]).is_err());
    }

    #[test]
    fn test_mask_collision_detection() {
        let points = array![[500, 500, 0], [500, 3, 1], [0, 0, 0]];
        assert_eq!(count_mask_collisions(&points, 500.0), 1);
        assert!(check_mask_value(&points, 500.0).is_err());
        assert!(check_mask_value(&points, 301.0).is_ok());
    }
}
