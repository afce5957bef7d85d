use burn::data::dataset::Dataset;

use crate::data::cutter::CutTensor;

/// One cut sample: `cut_len * 3` values in row order, padding included.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeItem {
    pub values: Vec<f32>,
    pub length: usize,
}

impl StrokeItem {
    pub fn cut_len(&self) -> usize {
        self.values.len() / 3
    }
}

pub struct StrokeDataset {
    items: Vec<StrokeItem>,
}

impl StrokeDataset {
    pub fn new(items: Vec<StrokeItem>) -> Self { Self { items } }

    /// Split a time-major cut tensor back into per-sample items.
    pub fn from_tensor(tensor: &CutTensor) -> Self {
        let data  = tensor.data();
        let items = (0..tensor.sample_count())
            .map(|j| StrokeItem {
                values: (0..tensor.cut_len())
                    .flat_map(|t| (0..3).map(move |c| data[[t, j, c]]))
                    .collect(),
                length: tensor.lengths()[j],
            })
            .collect();
        Self { items }
    }

    pub fn sample_count(&self) -> usize { self.items.len() }
}

impl Dataset<StrokeItem> for StrokeDataset {
    fn get(&self, index: usize) -> Option<StrokeItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
