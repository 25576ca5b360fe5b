//! Error types for the pipeline module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fatal pipeline errors.
///
/// Deliberately small: tool failures, findings and synthesis errors are
/// report content, not errors. Only a filesystem that cannot hold the
/// artifacts aborts a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot create artifact directory {path}: {source}")]
    ArtifactDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write artifact: {0}")]
    Artifact(#[from] forge_module::ModuleError),

    #[error("cannot write run summary: {0}")]
    Summary(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
