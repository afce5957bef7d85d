// ============================================================
// Layer 2 - CheckMaskUseCase
// ============================================================
// Counts the rows of a built split whose x and y both equal a
// candidate mask value. A usable mask value has zero hits.

use anyhow::Result;
use std::path::PathBuf;

use crate::data::cutter::count_mask_collisions;
use crate::domain::sample::Split;
use crate::infra::artifact_store::ArtifactStore;

#[derive(Debug, Clone)]
pub struct CheckMaskConfig {
    pub source_dir: PathBuf,
    pub split:      Split,
    pub mask_value: f32,
}

pub struct CheckMaskUseCase {
    config: CheckMaskConfig,
}

impl CheckMaskUseCase {
    pub fn new(config: CheckMaskConfig) -> Self {
        Self { config }
    }

    /// Number of colliding rows.
    pub fn execute(&self) -> Result<usize> {
        let cfg  = &self.config;
        let flat = ArtifactStore::new(&cfg.source_dir).load_split(cfg.split)?;
        let hits = count_mask_collisions(flat.points(), cfg.mask_value);

        if hits == 0 {
            tracing::info!("Mask value {} is unused in the {} split", cfg.mask_value, cfg.split);
        } else {
            tracing::warn!(
                "Mask value {} appears in {} of {} {} rows",
                cfg.mask_value,
                hits,
                flat.points().nrows(),
                cfg.split
            );
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::FlatArtifact;
    use ndarray::array;

    #[test]
    fn test_counts_collisions() {
        let dir  = tempfile::tempdir().unwrap();
        let flat = FlatArtifact::new(array![[0, 0, 0], [7, 7, 1], [7, 2, 1]], array![1i64, 2]).unwrap();
        ArtifactStore::new(dir.path()).save_split(Split::Test, &flat).unwrap();

        let check = |mask_value| {
            CheckMaskUseCase::new(CheckMaskConfig {
                source_dir: dir.path().to_path_buf(),
                split:      Split::Test,
                mask_value,
            })
            .execute()
            .unwrap()
        };
        assert_eq!(check(7.0), 1);
        assert_eq!(check(0.0), 1);
        assert_eq!(check(500.0), 0);
    }
}
