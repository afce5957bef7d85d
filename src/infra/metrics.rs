// ============================================================
// Layer 6 - Length Histogram
// ============================================================
// Records how long the samples of a split are, so cut_len can
// be chosen with the length distribution in view.
//
// 50 equal-width bins span [min, max]; the last bin includes max.
// When every sample has the same length the single value sits
// in the middle of a range one unit wide.
//
// Output file: {target_dir}/{split}_length_histogram.csv
//
// Example CSV output:
//   lower,upper,count
//   12.000000,31.760000,4
//   31.760000,51.520000,17
//   ...
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use ndarray::Array1;
use std::{fs, io::Write, path::Path};

use crate::domain::sample::Split;

pub const HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LengthHistogram {
    bins:    Vec<HistogramBin>,
    samples: usize,
    min:     i64,
    max:     i64,
    mean:    f64,
}

impl LengthHistogram {
    pub fn compute(lengths: &Array1<i64>, bin_count: usize) -> Self {
        let samples = lengths.len();
        if samples == 0 || bin_count == 0 {
            return Self { bins: Vec::new(), samples, min: 0, max: 0, mean: 0.0 };
        }

        let min  = lengths.iter().copied().min().unwrap_or(0);
        let max  = lengths.iter().copied().max().unwrap_or(0);
        let mean = lengths.iter().map(|&l| l as f64).sum::<f64>() / samples as f64;

        let (lo, hi) = if min == max {
            (min as f64 - 0.5, max as f64 + 0.5)
        } else {
            (min as f64, max as f64)
        };
        let width = (hi - lo) / bin_count as f64;

        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: lo + width * i as f64,
                upper: lo + width * (i + 1) as f64,
                count: 0,
            })
            .collect();
        for &len in lengths.iter() {
            let slot = (((len as f64 - lo) / width).floor() as usize).min(bin_count - 1);
            bins[slot].count += 1;
        }

        Self { bins, samples, min, max, mean }
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn log_summary(&self, split: Split) {
        if self.samples == 0 {
            tracing::info!("{} split has no samples", split);
            return;
        }
        tracing::info!(
            "{} lengths: {} samples, min {}, max {}, mean {:.1}",
            split,
            self.samples,
            self.min,
            self.max,
            self.mean
        );
    }

    /// Write the bins as CSV, replacing any earlier file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut f = fs::File::create(path)
            .with_context(|| format!("Cannot create histogram '{}'", path.display()))?;
        writeln!(f, "lower,upper,count")?;
        for bin in &self.bins {
            writeln!(f, "{:.6},{:.6},{}", bin.lower, bin.upper, bin.count)?;
        }
        tracing::debug!("Wrote length histogram to '{}'", path.display());
        Ok(())
    }
}
