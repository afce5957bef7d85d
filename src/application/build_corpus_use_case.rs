// ============================================================
// Layer 2 - BuildCorpusUseCase
// ============================================================
// Orchestrates corpus construction in order:
//
//   Step 1: Validate the configuration       (Layer 2)
//   Step 2: Load the test manifest           (Layer 4 - data)
//   Step 3: Walk the root, split the files   (Layer 4 - data)
//   Step 4: Per split: extract every sample  (Layer 4 - data)
//   Step 5: Per split: write .npy artifacts  (Layer 6 - infra)
//   Step 6: Per split: length histogram      (Layer 6 - infra)
//   Step 7: Save the build record            (Layer 6 - infra)
//
// Artifacts and the record of any earlier build are removed before
// extraction starts. Splits are then built one after the other and
// the record is rewritten after each one. A failure while building
// the test split keeps the new train artifacts, leaves no test
// artifacts, and the record describes the train split only.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::application::config::PipelineConfig;
use crate::data::{
    loader::IamXmlSource,
    splitter::{discover_samples, CorpusSplitter, TestManifest},
};
use crate::domain::error::PipelineError;
use crate::domain::sample::Split;
use crate::infra::{
    artifact_store::ArtifactStore,
    metrics::{LengthHistogram, HISTOGRAM_BINS},
    stats_store::{CorpusRecord, StatsStore},
};

#[derive(Debug, Clone)]
pub struct BuildCorpusConfig {
    pub root_dir:   PathBuf,
    pub manifest:   Option<PathBuf>,
    pub target_dir: PathBuf,
    pub parallel:   bool,
    pub pipeline:   PipelineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusSummary {
    pub train_samples: usize,
    pub test_samples:  usize,
}

pub struct BuildCorpusUseCase {
    config: BuildCorpusConfig,
}

impl BuildCorpusUseCase {
    pub fn new(config: BuildCorpusConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CorpusSummary> {
        let cfg = &self.config;

        // ── Step 1: Validate ─────────────────────────────────────────────────
        cfg.pipeline.validate()?;
        if cfg.pipeline.interpolate {
            return Err(PipelineError::UnsupportedFeature(
                "interpolation between stroke points".to_string(),
            )
            .into());
        }
        let extractor = cfg.pipeline.extractor()?;

        // ── Step 2-3: Manifest and file discovery ────────────────────────────
        let source   = IamXmlSource::new();
        let manifest = TestManifest::load(cfg.manifest.as_deref())?;
        let files    = discover_samples(&cfg.root_dir, &source, &manifest)?;

        // ── Step 4-7: One split at a time ────────────────────────────────────
        // Earlier build outputs are cleared first, so a split that fails
        // here is left with no artifacts and the record only ever lists
        // splits built with the current settings.
        let splitter = CorpusSplitter::new(&source, extractor).with_parallel(cfg.parallel);
        let store    = ArtifactStore::new(&cfg.target_dir);
        let stats    = StatsStore::new(&cfg.target_dir);
        let mut summary = CorpusSummary { train_samples: 0, test_samples: 0 };

        stats.remove_corpus()?;
        for split in [Split::Train, Split::Test] {
            store.remove_split(split)?;
            let histogram_path = cfg.target_dir.join(format!("{split}_length_histogram.csv"));
            if histogram_path.is_file() {
                fs::remove_file(&histogram_path)
                    .with_context(|| format!("Cannot remove '{}'", histogram_path.display()))?;
            }
        }

        for split in [Split::Train, Split::Test] {
            tracing::info!("Building {} split from {} files", split, files.get(split).len());
            let flat = splitter.extract_split(split, files.get(split))?;
            store.save_split(split, &flat)?;

            let histogram = LengthHistogram::compute(flat.lengths(), HISTOGRAM_BINS);
            histogram.log_summary(split);
            histogram.write_csv(&cfg.target_dir.join(format!("{split}_length_histogram.csv")))?;

            match split {
                Split::Train => summary.train_samples = flat.sample_count(),
                Split::Test  => summary.test_samples  = flat.sample_count(),
            }

            // ── Step 7: Build record, refreshed after every finished split ───
            stats.save_corpus(&CorpusRecord {
                config:        cfg.pipeline,
                train_samples: summary.train_samples,
                test_samples:  summary.test_samples,
            })?;
        }

        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::indexer::SequenceIndexer;
    use std::fs;
    use std::path::Path;

    /// One stroke file per entry: (relative path, strokes as point lists).
    pub(crate) fn write_corpus(root: &Path, files: &[(&str, Vec<Vec<(i32, i32)>>)]) {
        for (rel, strokes) in files {
            let mut xml = String::from("<?xml version=\"1.0\"?>\n<WhiteboardCaptureSession><StrokeSet>");
            for stroke in strokes.iter() {
                xml.push_str("<Stroke>");
                for (x, y) in stroke.iter() {
                    xml.push_str(&format!("<Point x=\"{x}\" y=\"{y}\" time=\"0.0\"/>"));
                }
                xml.push_str("</Stroke>");
            }
            xml.push_str("</StrokeSet></WhiteboardCaptureSession>");

            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, xml).unwrap();
        }
    }

    pub(crate) fn small_corpus(root: &Path) {
        write_corpus(
            root,
            &[
                ("a01/a01-000/a01-000u-01.xml", vec![vec![(10, 20), (11, 20), (12, 25)], vec![(15, 30), (15, 31)]]),
                ("a01/a01-001/a01-001w-01.xml", vec![vec![(0, 0), (400, -5)]]),
                ("b02/b02-010/b02-010-01.xml",  vec![vec![(5, 5), (6, 6)], vec![(7, 7)]]),
            ],
        );
    }

    fn config(root: &Path, target: &Path, manifest: Option<PathBuf>) -> BuildCorpusConfig {
        BuildCorpusConfig {
            root_dir:   root.to_path_buf(),
            manifest,
            target_dir: target.to_path_buf(),
            parallel:   false,
            pipeline:   PipelineConfig::default(),
        }
    }

    #[test]
    fn test_build_splits_by_manifest() {
        let dir      = tempfile::tempdir().unwrap();
        let root     = dir.path().join("lineStrokes");
        let target   = dir.path().join("out");
        let manifest = dir.path().join("testset.txt");
        small_corpus(&root);
        fs::write(&manifest, "b02-010\n").unwrap();

        let summary = BuildCorpusUseCase::new(config(&root, &target, Some(manifest)))
            .execute()
            .unwrap();
        assert_eq!(summary, CorpusSummary { train_samples: 2, test_samples: 1 });

        let store = ArtifactStore::new(&target);
        let train = SequenceIndexer::load(&store, Split::Train).unwrap();
        // Sorted: a01-000 (5 points) before a01-001 (2 points)
        assert_eq!(train.offsets().to_vec(), vec![5usize, 7]);
        // Clipped offset of the second file
        assert_eq!(train.points().row(6).to_vec(), vec![300, -5, 1]);

        let test = SequenceIndexer::load(&store, Split::Test).unwrap();
        assert_eq!(test.points().nrows(), 3);

        assert!(target.join("train_length_histogram.csv").is_file());
        assert!(target.join("test_length_histogram.csv").is_file());
        assert!(StatsStore::new(&target).load_corpus().unwrap().is_some());
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let dir  = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        small_corpus(&root);

        let seq_dir = dir.path().join("seq");
        let par_dir = dir.path().join("par");
        BuildCorpusUseCase::new(config(&root, &seq_dir, None)).execute().unwrap();
        let mut par = config(&root, &par_dir, None);
        par.parallel = true;
        BuildCorpusUseCase::new(par).execute().unwrap();

        let a = ArtifactStore::new(&seq_dir).load_split(Split::Train).unwrap();
        let b = ArtifactStore::new(&par_dir).load_split(Split::Train).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sample_count(), 3);
    }

    #[test]
    fn test_malformed_test_sample_keeps_train_artifacts() {
        let dir    = tempfile::tempdir().unwrap();
        let root   = dir.path().join("root");
        let target = dir.path().join("out");
        small_corpus(&root);
        write_corpus(&root, &[("c03/c03-000/broken.xml", vec![vec![]])]);
        let manifest = dir.path().join("testset.txt");
        fs::write(&manifest, "c03-000\n").unwrap();

        let result = BuildCorpusUseCase::new(config(&root, &target, Some(manifest))).execute();
        assert!(result.is_err());

        let store = ArtifactStore::new(&target);
        assert!(store.load_split(Split::Train).is_ok());
        assert!(store.load_split(Split::Test).is_err());
    }

    #[test]
    fn test_failed_rebuild_clears_previous_build() {
        let dir    = tempfile::tempdir().unwrap();
        let root   = dir.path().join("root");
        let target = dir.path().join("out");
        let manifest = dir.path().join("testset.txt");
        small_corpus(&root);
        fs::write(&manifest, "b02-010\n").unwrap();

        BuildCorpusUseCase::new(config(&root, &target, Some(manifest.clone()))).execute().unwrap();
        assert!(ArtifactStore::new(&target).load_split(Split::Test).is_ok());

        write_corpus(&root, &[("b02/b02-010/broken.xml", vec![vec![]])]);
        let mut rebuild = config(&root, &target, Some(manifest));
        rebuild.pipeline.max_dist = 50;
        assert!(BuildCorpusUseCase::new(rebuild).execute().is_err());

        let store = ArtifactStore::new(&target);
        let train = store.load_split(Split::Train).unwrap();
        assert_eq!(train.points().row(6).to_vec(), vec![50, -5, 1]);
        assert!(!store.sequences_path(Split::Test).exists());
        assert!(!store.indices_path(Split::Test).exists());
        assert!(!target.join("test_length_histogram.csv").exists());

        let record = StatsStore::new(&target).load_corpus().unwrap().unwrap();
        assert_eq!(record.config.max_dist, 50);
        assert_eq!(record.train_samples, 2);
        assert_eq!(record.test_samples, 0);
    }

    #[test]
    fn test_interpolation_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), &dir.path().join("out"), None);
        cfg.pipeline.interpolate = true;

        let err = BuildCorpusUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnsupportedFeature(_))
        ));
    }
}
