//! Generated module model.

use serde::{Deserialize, Serialize};

/// One named file in the generated module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleFile {
    pub name: String,
    pub content: String,
}

/// The generated artifact set for one pipeline run.
///
/// Owned by the orchestrator for the run's lifetime. Stages append files
/// as they complete; a stage never rewrites what an earlier stage wrote,
/// though re-adding the same name replaces the entry before it reaches
/// disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    /// Design text the synthesizer produced for this module
    pub blueprint: String,
    files: Vec<ModuleFile>,
}

impl Module {
    pub fn new(blueprint: impl Into<String>) -> Self {
        Self {
            blueprint: blueprint.into(),
            files: Vec::new(),
        }
    }

    /// Add a file, replacing any existing entry with the same name.
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        if let Some(existing) = self.files.iter_mut().find(|f| f.name == name) {
            existing.content = content;
        } else {
            self.files.push(ModuleFile { name, content });
        }
    }

    /// Look up a file's content by name.
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.content.as_str())
    }

    /// Files in the order stages added them.
    pub fn files(&self) -> &[ModuleFile] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
