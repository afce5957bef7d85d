// ============================================================
// Layer 2 - Pipeline Configuration
// ============================================================
// The knobs every pipeline entry point accepts. Serialisable so
// the exact settings behind a built corpus or a cut tensor are
// written next to it and can be reloaded for rendering.
//
//   max_dist    clip bound for per-axis offsets         (300)
//   cut_len     time steps kept per sample              (500)
//   mask        pad with mask_value instead of 0        (true)
//   mask_value  padding sentinel                        (500)
//   normalize   standardise x and y                     (true)
//   interpolate fill gaps between distant points        (false, unsupported)
//
// Reference: serde documentation (derive)

use serde::{Deserialize, Serialize};

use crate::data::cutter::{CutOptions, DEFAULT_CUT_LEN, DEFAULT_MASK_VALUE};
use crate::data::extractor::{StrokeExtractor, DEFAULT_MAX_DIST};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::Split;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_dist:   i32,
    pub cut_len:    usize,
    pub mask:       bool,
    pub mask_value: f32,
    pub normalize:  bool,
    #[serde(default)]
    pub interpolate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dist:    DEFAULT_MAX_DIST,
            cut_len:     DEFAULT_CUT_LEN,
            mask:        true,
            mask_value:  DEFAULT_MASK_VALUE,
            normalize:   true,
            interpolate: false,
        }
    }
}

impl PipelineConfig {
    /// Reject settings no stage can run with.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.max_dist <= 0 {
            return Err(PipelineError::Configuration(format!(
                "max_dist must be positive, got {}",
                self.max_dist
            )));
        }
        if self.cut_len == 0 {
            return Err(PipelineError::Configuration(
                "cut_len must be greater than zero".to_string(),
            ));
        }
        if !self.mask_value.is_finite() {
            return Err(PipelineError::Configuration(format!(
                "mask_value must be finite, got {}",
                self.mask_value
            )));
        }
        if self.mask && !self.normalize && self.mask_value.abs() <= self.max_dist as f32 {
            tracing::warn!(
                "mask value {} lies inside the clip range ±{}; real rows may look like padding",
                self.mask_value,
                self.max_dist
            );
        }
        Ok(())
    }

    /// Value padding rows are filled with.
    pub fn pad_value(&self) -> f32 {
        self.cut_options().pad_value()
    }

    pub fn cut_options(&self) -> CutOptions {
        CutOptions {
            cut_len:    self.cut_len,
            normalize:  self.normalize,
            mask:       self.mask,
            mask_value: self.mask_value,
        }
    }

    pub fn extractor(&self) -> PipelineResult<StrokeExtractor> {
        Ok(StrokeExtractor::new(self.max_dist)?.with_interpolation(self.interpolate))
    }

    /// File stem of a cut tensor, e.g. `test_cut_500_pad_500_max_300_norm`.
    pub fn tensor_stem(&self, split: Split) -> String {
        let norm = if self.normalize { "_norm" } else { "" };
        format!(
            "{split}_cut_{}_pad_{}_max_{}{norm}",
            self.cut_len,
            self.pad_value(),
            self.max_dist
        )
    }
}
