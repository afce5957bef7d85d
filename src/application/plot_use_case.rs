// ============================================================
// Layer 2 - PlotUseCase
// ============================================================
// Renders one sample back to handwriting:
//
//   from a cut tensor  → drop padding, undo normalisation using
//                        the stats record saved next to the tensor
//   from a built split → raw deltas, nothing to undo
//
// Without a stats record the tensor is drawn as stored, with the
// true lengths recovered from the pad value.
//
// When no index is given one is picked at random.

use anyhow::{bail, Result};
use rand::Rng;
use std::path::PathBuf;

use crate::data::{
    cutter::CutTensor,
    indexer::SequenceIndexer,
    renderer::{InverseRenderer, DEFAULT_ACCUMULATE_FROM},
};
use crate::domain::sample::Split;
use crate::infra::{
    artifact_store::{load_tensor, ArtifactStore},
    plot_canvas::PlotlyCanvas,
    stats_store::load_cut_record,
};

#[derive(Debug, Clone)]
pub enum PlotSource {
    Tensor(PathBuf),
    Corpus { dir: PathBuf, split: Split },
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub source:          PlotSource,
    pub index:           Option<usize>,
    pub output:          PathBuf,
    pub accumulate_from: usize,
    /// Pad value used to recover lengths when a tensor has no record.
    pub mask_value:      f32,
}

impl PlotConfig {
    pub fn new(source: PlotSource, output: impl Into<PathBuf>) -> Self {
        Self {
            source,
            index:           None,
            output:          output.into(),
            accumulate_from: DEFAULT_ACCUMULATE_FROM,
            mask_value:      crate::data::cutter::DEFAULT_MASK_VALUE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotOutcome {
    pub index:   usize,
    pub strokes: usize,
    pub output:  PathBuf,
}

/// The requested index, or a random one when none was given.
fn pick_index(requested: Option<usize>, count: usize) -> Result<usize> {
    if count == 0 {
        bail!("Nothing to plot: the source holds no samples");
    }
    match requested {
        Some(i) if i >= count => bail!("Sample index {i} out of range ({count} samples)"),
        Some(i) => Ok(i),
        None    => Ok(rand::thread_rng().gen_range(0..count)),
    }
}

pub struct PlotUseCase {
    config: PlotConfig,
}

impl PlotUseCase {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PlotOutcome> {
        let cfg      = &self.config;
        let renderer = InverseRenderer::new().with_accumulate_from(cfg.accumulate_from);

        let (index, strokes) = match &cfg.source {
            PlotSource::Tensor(path) => {
                let data = load_tensor(path)?;
                let (tensor, renderer) = match load_cut_record(path)? {
                    Some(record) => (
                        CutTensor::from_parts(data, record.lengths)?,
                        renderer.with_stats(&record.stats),
                    ),
                    None => {
                        tracing::warn!(
                            "No stats record next to '{}', drawing normalised values",
                            path.display()
                        );
                        (CutTensor::from_padded(data, cfg.mask_value)?, renderer)
                    }
                };
                let index  = pick_index(cfg.index, tensor.sample_count())?;
                let sample = tensor.unpadded_sample(index)?;
                let title  = format!("{} #{index}", path.display());
                (index, self.draw(&renderer, sample.view(), title)?)
            }
            PlotSource::Corpus { dir, split } => {
                let corpus = SequenceIndexer::load(&ArtifactStore::new(dir), *split)?;
                let index  = pick_index(cfg.index, corpus.sample_count())?;
                let title  = format!("{split} #{index}");
                (index, self.draw(&renderer, corpus.sample(index)?, title)?)
            }
        };

        Ok(PlotOutcome { index, strokes, output: cfg.output.clone() })
    }

    fn draw<A>(&self, renderer: &InverseRenderer, sample: ndarray::ArrayView2<'_, A>, title: String) -> Result<usize>
    where
        A: Copy + Into<f64>,
    {
        let mut canvas = PlotlyCanvas::new(&self.config.output, title);
        renderer.render(sample, &mut canvas)?;
        Ok(canvas.stroke_count())
    }
}
