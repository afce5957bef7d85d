// ============================================================
// Layer 6 - Stats Store
// ============================================================
// Saves the settings and normalisation statistics behind each
// artifact as pretty JSON, so a tensor can be denormalised and
// rendered later without recomputing anything.
//
// What gets saved:
//   1. corpus_config.json     - settings + sample counts of a build
//   2. {tensor stem}_stats.json - settings, mean/std and true
//                                 lengths of one cut tensor
//
// File naming convention:
//   target_dir/
//     corpus_config.json
//     test_cut_500_pad_500_max_300_norm.npy
//     test_cut_500_pad_500_max_300_norm_stats.json
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::config::PipelineConfig;
use crate::data::cutter::NormalizationStats;
use crate::domain::sample::Split;

const CORPUS_RECORD: &str = "corpus_config.json";

/// Everything needed to interpret a saved cut tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutRecord {
    pub split:   Split,
    pub config:  PipelineConfig,
    pub stats:   NormalizationStats,
    pub lengths: Vec<usize>,
}

/// Summary of one corpus build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub config:        PipelineConfig,
    pub train_samples: usize,
    pub test_samples:  usize,
}

/// `foo.npy` → `foo_stats.json`, in the same directory.
pub fn record_path_for(tensor_path: &Path) -> PathBuf {
    let stem = tensor_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    tensor_path.with_file_name(format!("{stem}_stats.json"))
}

/// Read the record saved next to a tensor, if there is one.
pub fn load_cut_record(tensor_path: &Path) -> Result<Option<CutRecord>> {
    let path = record_path_for(tensor_path);
    if !path.is_file() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read stats from '{}'", path.display()))?;
    let record = serde_json::from_str(&json)
        .with_context(|| format!("Cannot parse stats in '{}'", path.display()))?;
    Ok(Some(record))
}

pub struct StatsStore {
    dir: PathBuf,
}

impl StatsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    /// Save the record of the tensor stored as `{stem}.npy`.
    pub fn save_cut(&self, stem: &str, record: &CutRecord) -> Result<PathBuf> {
        let path = self.dir.join(format!("{stem}_stats.json"));
        self.write_json(&path, record)?;
        Ok(path)
    }

    pub fn save_corpus(&self, record: &CorpusRecord) -> Result<()> {
        self.write_json(&self.dir.join(CORPUS_RECORD), record)
    }

    /// Drop the build record, if there is one.
    pub fn remove_corpus(&self) -> Result<()> {
        let path = self.dir.join(CORPUS_RECORD);
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove '{}'", path.display()))?;
        }
        Ok(())
    }

    /// The build record, if the directory holds a built corpus.
    pub fn load_corpus(&self) -> Result<Option<CorpusRecord>> {
        let path = self.dir.join(CORPUS_RECORD);
        if !path.is_file() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_path_for_tensor() {
        let p = record_path_for(Path::new("out/test_cut_500_norm.npy"));
        assert_eq!(p, PathBuf::from("out/test_cut_500_norm_stats.json"));
    }

    #[test]
    fn test_cut_record_found_next_to_tensor() {
        let dir   = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path());
        let record = CutRecord {
            split:   Split::Test,
            config:  PipelineConfig::default(),
            stats:   NormalizationStats { mean: [1.0, 2.0, 0.1], std: [3.0, 4.0, 0.3] },
            lengths: vec![5, 2],
        };
        store.save_cut("test_cut", &record).unwrap();

        let loaded = load_cut_record(&dir.path().join("test_cut.npy")).unwrap();
        assert_eq!(loaded, Some(record));
        assert_eq!(load_cut_record(&dir.path().join("other.npy")).unwrap(), None);
    }

    #[test]
    fn test_stats_reload_bit_exact() {
        let dir   = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path());
        let stats = NormalizationStats {
            mean: [0.1 + 0.2, -3.729_411_764_705_882, 0.318_181_818_181_818_2],
            std:  [94.009_981_082_914_17, 1.0 / 3.0, 0.465_794_213_928_497_86],
        };
        let record = CutRecord {
            split:   Split::Train,
            config:  PipelineConfig::default(),
            stats,
            lengths: vec![1],
        };
        store.save_cut("exact", &record).unwrap();

        let loaded = load_cut_record(&dir.path().join("exact.npy")).unwrap().unwrap();
        for c in 0..3 {
            assert_eq!(loaded.stats.mean[c].to_bits(), stats.mean[c].to_bits());
            assert_eq!(loaded.stats.std[c].to_bits(), stats.std[c].to_bits());
        }
    }

    #[test]
    fn test_corpus_record() {
        let dir   = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path());
        assert!(store.load_corpus().unwrap().is_none());

        let record = CorpusRecord { config: PipelineConfig::default(), train_samples: 7, test_samples: 2 };
        store.save_corpus(&record).unwrap();
        assert_eq!(store.load_corpus().unwrap(), Some(record));

        store.remove_corpus().unwrap();
        assert!(store.load_corpus().unwrap().is_none());
        // Nothing left to remove is fine
        store.remove_corpus().unwrap();
    }
}
