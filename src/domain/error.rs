// ============================================================
// Layer 3 - Pipeline Errors
// ============================================================
// Every failure the stroke pipeline can raise. All of them are
// returned to the immediate caller; nothing is retried, since
// every stage is a deterministic local transform.
//
//   MalformedSample    - a sample with no strokes, or an empty stroke
//   CorpusIo           - flat artifacts missing, unreadable or inconsistent
//   Configuration      - bad cut length / clip bound, colliding mask value
//   UnsupportedFeature - interpolation between stroke points
//   SourceIo           - a raw stroke file could not be read
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed sample '{source_name}': {reason}")]
    MalformedSample { source_name: String, reason: String },

    #[error("corpus artifact error: {0}")]
    CorpusIo(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("cannot read stroke file '{path}'")]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSample {
            source_name: source_name.into(),
            reason:      reason.into(),
        }
    }
}
