//! Pipeline stage identifiers.

use serde::{Deserialize, Serialize};

/// Stages of a generation-validation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Synthesize the module blueprint from the requirement
    Design,
    /// Synthesize and persist the module files
    Code,
    /// Secret scan, static analysis, policy-as-code
    Security,
    /// Behavior-driven and integration test flows
    Test,
    /// Module documentation
    Docs,
    /// Terminal state; always reached
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Design => "design",
            Stage::Code => "code",
            Stage::Security => "security",
            Stage::Test => "test",
            Stage::Docs => "docs",
            Stage::Done => "done",
        }
    }

    /// Execution order of the run.
    pub fn sequence() -> [Stage; 6] {
        [
            Stage::Design,
            Stage::Code,
            Stage::Security,
            Stage::Test,
            Stage::Docs,
            Stage::Done,
        ]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_ends_in_done() {
        let sequence = Stage::sequence();
        assert_eq!(sequence.len(), 6);
        assert_eq!(sequence[0], Stage::Design);
        assert_eq!(sequence[5], Stage::Done);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Stage::Security).unwrap(), "\"security\"");
    }
}
