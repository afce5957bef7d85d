// ============================================================
// Layer 4 - Sequence Indexer
// ============================================================
// Converts the persisted per-sample LENGTHS into cumulative
// OFFSETS so the flat point matrix can be sliced back into
// samples:
//
//   lengths: [3, 2, 4]
//   offsets: [3, 5, 9]        offsets[i] = exclusive end of sample i
//
//   sample i = rows [offsets[i-1], offsets[i])   with offsets[-1] = 0
//
// Offsets are derived on every load and never written to disk.

use ndarray::{s, Array1, Array2, ArrayView2};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::{FlatArtifact, Split};
use crate::infra::artifact_store::ArtifactStore;

/// Prefix sum of the length index.
pub fn offsets_from_lengths(lengths: &Array1<i64>) -> Array1<usize> {
    let mut running = 0usize;
    lengths
        .iter()
        .map(|&len| {
            running += len as usize;
            running
        })
        .collect()
}

/// A flat point matrix together with its offset index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedCorpus {
    points:  Array2<i32>,
    offsets: Array1<usize>,
}

impl IndexedCorpus {
    pub fn points(&self) -> &Array2<i32> {
        &self.points
    }

    pub fn offsets(&self) -> &Array1<usize> {
        &self.offsets
    }

    pub fn sample_count(&self) -> usize {
        self.offsets.len()
    }

    /// Row range `[start, end)` of sample `index` in the flat matrix.
    pub fn bounds(&self, index: usize) -> PipelineResult<(usize, usize)> {
        let end = *self.offsets.get(index).ok_or_else(|| {
            PipelineError::CorpusIo(format!(
                "sample {index} out of range ({} samples)",
                self.sample_count()
            ))
        })?;
        let start = if index == 0 { 0 } else { self.offsets[index - 1] };
        Ok((start, end))
    }

    /// Borrow one sample's rows.
    pub fn sample(&self, index: usize) -> PipelineResult<ArrayView2<'_, i32>> {
        let (start, end) = self.bounds(index)?;
        Ok(self.points.slice(s![start..end, ..]))
    }

    /// Every sample in storage order.
    pub fn samples(&self) -> Vec<ArrayView2<'_, i32>> {
        let mut start = 0usize;
        self.offsets
            .iter()
            .map(|&end| {
                let view = self.points.slice(s![start..end, ..]);
                start = end;
                view
            })
            .collect()
    }
}

pub struct SequenceIndexer;

impl SequenceIndexer {
    /// Index an in-memory artifact. The artifact already guarantees
    /// `sum(lengths) == rows`, so the last offset equals the row count.
    pub fn index(flat: FlatArtifact) -> IndexedCorpus {
        let (points, lengths) = flat.into_parts();
        let offsets = offsets_from_lengths(&lengths);
        IndexedCorpus { points, offsets }
    }

    /// Load one split's artifacts from disk and index them.
    pub fn load(store: &ArtifactStore, split: Split) -> PipelineResult<IndexedCorpus> {
        let flat = store.load_split(split)?;
        tracing::debug!(
            "Indexed {} {} samples over {} rows",
            flat.sample_count(),
            split,
            flat.points().nrows()
        );
        Ok(Self::index(flat))
    }
}
