// ============================================================
// Layer 4 - Corpus Splitter
// ============================================================
// Walks a tree of stroke files and assigns every sample to the
// train or test split:
//
//   root/
//     a01/
//       a01-000/            ← listed in the manifest → test
//         a01-000u-01.xml
//       a01-001/            ← not listed             → train
//         a01-001w-02.xml
//
// A sample is in the test split when the name of its IMMEDIATE
// parent directory appears in the manifest (one name per line).
// No manifest, or an empty one, puts everything in train.
//
// Paths are sorted lexicographically inside each split before
// extraction, so the flat artifacts come out in the same order
// on every filesystem. Extraction may run on a rayon pool; the
// collected results keep the sorted order.
//
// Failure policy: the first sample that fails extraction aborts
// the whole split. No partial split is ever returned.
//
// Reference: walkdir crate documentation
//            rayon crate documentation (ParallelIterator)

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array2;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::data::extractor::StrokeExtractor;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::{FlatArtifact, Split};
use crate::domain::traits::StrokeSource;

// ─── TestManifest ─────────────────────────────────────────────────────────────
/// The set of leaf directory names that belong to the test split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestManifest {
    dirs: HashSet<String>,
}

impl TestManifest {
    /// Parse manifest text: one directory name per line, trailing
    /// whitespace stripped, blank lines ignored.
    pub fn parse(text: &str) -> Self {
        let dirs = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { dirs }
    }

    /// Load the manifest file. `None` or a missing file means every
    /// sample is train.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::warn!(
                "Test manifest '{}' does not exist, all samples go to train",
                path.display()
            );
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| PipelineError::SourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&text);
        tracing::info!("Test manifest lists {} directories", manifest.len());
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Which split a sample file belongs to, by its parent directory name.
    pub fn classify(&self, sample_path: &Path) -> Split {
        let parent = sample_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str());
        match parent {
            Some(name) if self.dirs.contains(name) => Split::Test,
            _ => Split::Train,
        }
    }
}

// ─── SplitFiles ───────────────────────────────────────────────────────────────
/// Sample files found under the corpus root, per split, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitFiles {
    pub train: Vec<PathBuf>,
    pub test:  Vec<PathBuf>,
}

impl SplitFiles {
    pub fn get(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Test  => &self.test,
        }
    }
}

/// Walk `root` and classify every file the source accepts.
pub fn discover_samples<S: StrokeSource + ?Sized>(
    root:     &Path,
    source:   &S,
    manifest: &TestManifest,
) -> PipelineResult<SplitFiles> {
    let mut files = SplitFiles::default();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            PipelineError::SourceIo { path, source: e.into() }
        })?;
        if !entry.file_type().is_file() || !source.accepts(entry.path()) {
            continue;
        }
        let path = entry.into_path();
        match manifest.classify(&path) {
            Split::Train => files.train.push(path),
            Split::Test  => files.test.push(path),
        }
    }

    files.train.sort();
    files.test.sort();

    tracing::info!(
        "Found {} train and {} test samples under '{}'",
        files.train.len(),
        files.test.len(),
        root.display()
    );
    Ok(files)
}

// ─── CorpusSplitter ───────────────────────────────────────────────────────────
/// Runs the stroke extractor over every file of a split and
/// concatenates the results into one FlatArtifact.
pub struct CorpusSplitter<'a, S: StrokeSource + ?Sized> {
    source:    &'a S,
    extractor: StrokeExtractor,
    parallel:  bool,
}

impl<'a, S: StrokeSource + ?Sized> CorpusSplitter<'a, S> {
    pub fn new(source: &'a S, extractor: StrokeExtractor) -> Self {
        Self { source, extractor, parallel: false }
    }

    /// Extract on the rayon thread pool instead of sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Extract every file of one split, in the order given.
    pub fn extract_split(&self, split: Split, paths: &[PathBuf]) -> PipelineResult<FlatArtifact> {
        let total    = paths.len();
        let every    = split.progress_every();
        let progress = AtomicUsize::new(0);

        let extract_one = |path: &PathBuf| -> PipelineResult<Array2<i32>> {
            let raw     = self.source.read_sample(path)?;
            let encoded = self.extractor.extract(&raw)?;
            let done    = progress.fetch_add(1, Ordering::Relaxed) + 1;
            if done % every == 0 {
                tracing::info!("loaded {}/{} {} files", done, total, split);
            }
            Ok(encoded)
        };

        let samples: Vec<Array2<i32>> = if self.parallel {
            paths.par_iter().map(extract_one).collect::<PipelineResult<_>>()?
        } else {
            paths.iter().map(extract_one).collect::<PipelineResult<_>>()?
        };

        let flat = FlatArtifact::from_samples(&samples)?;
        tracing::info!(
            "Extracted {} {} samples ({} points)",
            flat.sample_count(),
            split,
            flat.points().nrows()
        );
        Ok(flat)
    }
}
