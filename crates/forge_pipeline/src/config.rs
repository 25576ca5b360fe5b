//! Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Immutable per-run pipeline settings, built once at startup.
///
/// The artifact directory is exclusively owned by one run: concurrent
/// runs against the same directory would corrupt the intermediate plan
/// and policy artifacts, so multi-run isolation is the caller's job via
/// distinct directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory every artifact and report is written into
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
