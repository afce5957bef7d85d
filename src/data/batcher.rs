// ============================================================
// Layer 4 - Stroke Batcher
// ============================================================
// Implements Burn's Batcher trait so a cut corpus can be fed to
// a recurrent model through Burn's DataLoader.
//
// How batching works here:
//   Input:  Vec of B StrokeItems, each cut_len * 3 values
//   Output: StrokeBatch with inputs of shape [cut_len, B, 3]
//
//   Items are flattened sample-major into one Vec, shaped to
//   [B, cut_len, 3], then the first two axes are swapped so the
//   time axis comes first, matching the cut tensor on disk.
//
// Padding rows are passed through untouched; `lengths` carries
// each sample's real row count so the consumer can stop early.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::cutter::CutTensor;
use crate::data::dataset::StrokeItem;
use crate::domain::sample::POINT_COLUMNS;

// ─── StrokeBatch ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct StrokeBatch<B: Backend> {
    /// Time-major sequences - shape: [cut_len, batch_size, 3]
    pub inputs: Tensor<B, 3>,

    /// Real (unpadded) length per sample - shape: [batch_size]
    pub lengths: Tensor<B, 1, Int>,
}

// ─── StrokeBatcher ────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct StrokeBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> StrokeBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<StrokeItem, StrokeBatch<B>> for StrokeBatcher<B> {
    fn batch(&self, items: Vec<StrokeItem>) -> StrokeBatch<B> {
        let batch_size = items.len();
        let cut_len    = items.first().map(StrokeItem::cut_len).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|item| item.values.iter().copied())
            .collect();

        let lengths: Vec<i32> = items
            .iter()
            .map(|item| item.length as i32)
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, cut_len, POINT_COLUMNS])
            .swap_dims(0, 1);

        let lengths = Tensor::<B, 1, Int>::from_ints(lengths.as_slice(), &self.device);

        StrokeBatch { inputs, lengths }
    }
}

/// The whole cut corpus as one `[cut_len, N, 3]` tensor on `device`.
pub fn corpus_tensor<B: Backend>(tensor: &CutTensor, device: &B::Device) -> Tensor<B, 3> {
    let (cut_len, n, channels) = tensor.data().dim();
    let flat: Vec<f32> = tensor.data().iter().copied().collect();
    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([cut_len, n, channels])
}
