// ============================================================
// Layer 6 - Artifact Store
// ============================================================
// Reads and writes the on-disk corpus artifacts as .npy files
// using ndarray-npy.
//
// File naming convention:
//   target_dir/
//     train_sequences.npy          ← i32 [total_rows, 3]
//     train_sequence_indices.npy   ← i64 [n_samples] (lengths)
//     test_sequences.npy
//     test_sequence_indices.npy
//     test_cut_500_pad_500_max_300_norm.npy   ← f32 [cut_len, N, 3]
//
// A split is written to `*.npy.tmp` first and renamed into place
// only after both files were written. If the second rename fails
// the first file is removed again, so a split never ends up with
// a points file and an index from different writes.
//
// Points written as int64 (NumPy's default int) are accepted on
// load and narrowed to int32.
//
// Reference: ndarray-npy crate documentation (read_npy, write_npy)
//            Rust Book §12 (I/O and File Handling)

use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use ndarray::{Array1, Array2, Array3};
use ndarray_npy::{read_npy, write_npy};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::{FlatArtifact, Split};

fn corpus_err(action: &str, path: &Path, err: impl Display) -> PipelineError {
    PipelineError::CorpusIo(format!("cannot {action} '{}': {err}", path.display()))
}

/// Path with `.tmp` appended to the full file name.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// All corpus artifacts of one target directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sequences_path(&self, split: Split) -> PathBuf {
        self.dir.join(format!("{split}_sequences.npy"))
    }

    pub fn indices_path(&self, split: Split) -> PathBuf {
        self.dir.join(format!("{split}_sequence_indices.npy"))
    }

    pub fn tensor_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.npy"))
    }

    /// Write one split's point matrix and length index.
    pub fn save_split(&self, split: Split, flat: &FlatArtifact) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| corpus_err("create", &self.dir, e))?;

        let seq_path = self.sequences_path(split);
        let idx_path = self.indices_path(split);
        let seq_tmp  = tmp_path(&seq_path);
        let idx_tmp  = tmp_path(&idx_path);

        let written = write_npy(&seq_tmp, flat.points())
            .map_err(|e| corpus_err("write", &seq_tmp, e))
            .and_then(|_| {
                write_npy(&idx_tmp, flat.lengths()).map_err(|e| corpus_err("write", &idx_tmp, e))
            });
        if let Err(err) = written {
            let _ = fs::remove_file(&seq_tmp);
            let _ = fs::remove_file(&idx_tmp);
            return Err(err);
        }

        if let Err(e) = fs::rename(&seq_tmp, &seq_path) {
            let _ = fs::remove_file(&seq_tmp);
            let _ = fs::remove_file(&idx_tmp);
            return Err(corpus_err("rename", &seq_tmp, e));
        }
        // A points file must never sit beside an index from another write.
        if let Err(e) = fs::rename(&idx_tmp, &idx_path) {
            let _ = fs::remove_file(&seq_path);
            let _ = fs::remove_file(&idx_tmp);
            return Err(corpus_err("rename", &idx_tmp, e));
        }

        tracing::info!(
            "Saved {} {} samples to '{}'",
            flat.sample_count(),
            split,
            self.dir.display()
        );
        Ok(())
    }

    /// Delete one split's artifacts. Missing files are not an error.
    pub fn remove_split(&self, split: Split) -> PipelineResult<()> {
        for path in [self.sequences_path(split), self.indices_path(split)] {
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| corpus_err("remove", &path, e))?;
            }
        }
        Ok(())
    }

    /// Read one split back, checking the index against the matrix.
    pub fn load_split(&self, split: Split) -> PipelineResult<FlatArtifact> {
        let seq_path = self.sequences_path(split);
        let idx_path = self.indices_path(split);
        for path in [&seq_path, &idx_path] {
            if !path.is_file() {
                return Err(PipelineError::CorpusIo(format!(
                    "missing artifact '{}'. Has the corpus been built?",
                    path.display()
                )));
            }
        }

        let points  = read_points(&seq_path)?;
        let lengths = read_lengths(&idx_path)?;
        FlatArtifact::new(points, lengths)
    }

    /// Write a cut tensor as `{stem}.npy` and return its path.
    pub fn save_tensor(&self, stem: &str, data: &Array3<f32>) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| corpus_err("create", &self.dir, e))?;
        let path = self.tensor_path(stem);
        let tmp  = tmp_path(&path);
        write_npy(&tmp, data).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            corpus_err("write", &tmp, e)
        })?;
        fs::rename(&tmp, &path).map_err(|e| corpus_err("rename", &tmp, e))?;
        tracing::info!("Saved tensor {:?} to '{}'", data.dim(), path.display());
        Ok(path)
    }
}

/// Point matrix stored as int32, or as int64 (NumPy's default int)
/// narrowed to int32.
fn read_points(path: &Path) -> PipelineResult<Array2<i32>> {
    let first = match read_npy::<_, Array2<i32>>(path) {
        Ok(points) => return Ok(points),
        Err(e)     => e,
    };
    let wide: Array2<i64> = read_npy(path).map_err(|_| corpus_err("read", path, first))?;
    let mut narrow = Array2::<i32>::zeros(wide.dim());
    for (dst, &src) in narrow.iter_mut().zip(wide.iter()) {
        *dst = i32::try_from(src).map_err(|_| {
            corpus_err("read", path, format!("value {src} does not fit in int32"))
        })?;
    }
    Ok(narrow)
}

/// Length index stored as int64, or as int32 widened to int64.
fn read_lengths(path: &Path) -> PipelineResult<Array1<i64>> {
    let first = match read_npy::<_, Array1<i64>>(path) {
        Ok(lengths) => return Ok(lengths),
        Err(e)      => e,
    };
    let narrow: Array1<i32> = read_npy(path).map_err(|_| corpus_err("read", path, first))?;
    Ok(narrow.mapv(i64::from))
}

/// Read a cut tensor written by `save_tensor`.
pub fn load_tensor(path: &Path) -> PipelineResult<Array3<f32>> {
    read_npy(path).map_err(|e| corpus_err("read", path, e))
}
