//! Artifact persistence under the run's output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ModuleResult;
use crate::model::Module;

/// Writes module artifacts below a fixed root directory.
///
/// Writes overwrite existing content; parent directories are created on
/// demand so names like `test/security.feature` work directly.
#[derive(Debug, Clone)]
pub struct ModuleWriter {
    root: PathBuf,
}

impl ModuleWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one named file, returning its full path.
    ///
    /// Fails only on unrecoverable filesystem conditions (permissions,
    /// disk full); those abort the run at the orchestrator level.
    pub fn write_file(&self, name: &str, content: &str) -> ModuleResult<PathBuf> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Persist every file in the module, in insertion order.
    pub fn write_module(&self, module: &Module) -> ModuleResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(module.file_count());
        for file in module.files() {
            written.push(self.write_file(&file.name, &file.content)?);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ModuleWriter::new(dir.path());

        let path = writer.write_file("test/security.feature", "Feature: x").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(path).unwrap(), "Feature: x");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ModuleWriter::new(dir.path());

        writer.write_file("main.tf", "old").unwrap();
        writer.write_file("main.tf", "new").unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("main.tf")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_write_module_persists_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ModuleWriter::new(dir.path());

        let mut module = Module::new("bp");
        module.add_file("main.tf", "a");
        module.add_file("outputs.tf", "b");

        let written = writer.write_module(&module).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("outputs.tf").exists());
    }
}
