// ============================================================
// Layer 2 - CutUseCase
// ============================================================
// Turns one built split into a fixed-shape training tensor:
//
//   Step 1: Validate the configuration        (Layer 2)
//   Step 2: Load and index the split          (Layer 4 - data)
//   Step 3: Mask sentinel check (mask only)   (Layer 4 - data)
//   Step 4: Cut, normalise, pad               (Layer 4 - data)
//   Step 5: Save tensor + stats record        (Layer 6 - infra)
//
// The clip bound recorded with the tensor is the one the corpus
// was built with, when the build record is available.

use anyhow::Result;
use std::path::PathBuf;

use crate::application::config::PipelineConfig;
use crate::data::{
    cutter::{check_mask_value, CutPadNormalizer, NormalizationStats},
    indexer::SequenceIndexer,
};
use crate::domain::sample::Split;
use crate::infra::{
    artifact_store::ArtifactStore,
    stats_store::{CutRecord, StatsStore},
};

#[derive(Debug, Clone)]
pub struct CutConfig {
    pub source_dir: PathBuf,
    pub split:      Split,
    pub target_dir: PathBuf,
    pub pipeline:   PipelineConfig,
}

#[derive(Debug, Clone)]
pub struct CutOutcome {
    pub tensor_path:  PathBuf,
    pub record_path:  PathBuf,
    pub sample_count: usize,
    pub stats:        NormalizationStats,
}

pub struct CutUseCase {
    config: CutConfig,
}

impl CutUseCase {
    pub fn new(config: CutConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CutOutcome> {
        let cfg = &self.config;
        let mut pipeline = cfg.pipeline;

        // ── Step 1: Validate ─────────────────────────────────────────────────
        if let Some(built) = StatsStore::new(&cfg.source_dir).load_corpus()? {
            pipeline.max_dist = built.config.max_dist;
        }
        pipeline.validate()?;

        // ── Step 2: Load ─────────────────────────────────────────────────────
        let corpus = SequenceIndexer::load(&ArtifactStore::new(&cfg.source_dir), cfg.split)?;

        // ── Step 3: The pad value must never occur in real rows ──────────────
        if pipeline.mask {
            check_mask_value(corpus.points(), pipeline.mask_value)?;
        }

        // ── Step 4: Cut ──────────────────────────────────────────────────────
        let cutter = CutPadNormalizer::new(pipeline.cut_options())?;
        let (tensor, stats) = cutter.cut(&corpus);
        tracing::info!(
            "{} stats: mean ({:.3}, {:.3}, {:.3}), std ({:.3}, {:.3}, {:.3})",
            cfg.split,
            stats.mean[0], stats.mean[1], stats.mean[2],
            stats.std[0],  stats.std[1],  stats.std[2],
        );

        // ── Step 5: Save ─────────────────────────────────────────────────────
        let stem        = pipeline.tensor_stem(cfg.split);
        let tensor_path = ArtifactStore::new(&cfg.target_dir).save_tensor(&stem, tensor.data())?;
        let record = CutRecord {
            split:   cfg.split,
            config:  pipeline,
            stats,
            lengths: tensor.lengths().to_vec(),
        };
        let record_path = StatsStore::new(&cfg.target_dir).save_cut(&stem, &record)?;

        Ok(CutOutcome {
            tensor_path,
            record_path,
            sample_count: tensor.sample_count(),
            stats,
        })
    }
}
