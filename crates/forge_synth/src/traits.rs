//! Synthesizer trait and request types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SynthResult;

/// Logical request kinds the pipeline issues to the synthesizer.
///
/// An explicit enum rather than free-text matching, so backends dispatch
/// on a closed set and tests can script responses per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Module design text from the raw requirement
    Blueprint,
    /// main.tf content
    MainConfig,
    /// variables.tf content
    Variables,
    /// outputs.tf content
    Outputs,
    /// README.md content
    Readme,
    /// Gherkin feature scenarios for compliance testing
    BddSuite,
    /// Go integration test suite
    IntegrationSuite,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Blueprint => "blueprint",
            RequestKind::MainConfig => "main_config",
            RequestKind::Variables => "variables",
            RequestKind::Outputs => "outputs",
            RequestKind::Readme => "readme",
            RequestKind::BddSuite => "bdd_suite",
            RequestKind::IntegrationSuite => "integration_suite",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single synthesis request: what kind of artifact, and the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub kind: RequestKind,
    pub prompt: String,
}

impl SynthesisRequest {
    pub fn new(kind: RequestKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
        }
    }

    /// Design a module for a free-text requirement.
    pub fn blueprint(requirement: &str) -> Self {
        Self::new(
            RequestKind::Blueprint,
            format!("Design a Terraform module for: {requirement}"),
        )
    }

    pub fn main_config(blueprint: &str) -> Self {
        Self::new(
            RequestKind::MainConfig,
            format!("Write main.tf based on: {blueprint}"),
        )
    }

    pub fn variables(blueprint: &str) -> Self {
        Self::new(
            RequestKind::Variables,
            format!("Write variables.tf based on: {blueprint}"),
        )
    }

    pub fn outputs(blueprint: &str) -> Self {
        Self::new(
            RequestKind::Outputs,
            format!("Write outputs.tf based on: {blueprint}"),
        )
    }

    pub fn readme(blueprint: &str) -> Self {
        Self::new(
            RequestKind::Readme,
            format!("Write README.md documentation for: {blueprint}"),
        )
    }

    pub fn bdd_suite(blueprint: &str) -> Self {
        Self::new(
            RequestKind::BddSuite,
            format!("Write terraform-compliance BDD feature scenarios covering security requirements for: {blueprint}"),
        )
    }

    pub fn integration_suite(blueprint: &str) -> Self {
        Self::new(
            RequestKind::IntegrationSuite,
            format!("Write Terratest Go integration tests for: {blueprint}"),
        )
    }
}

/// An opaque content-generation capability.
///
/// Implementations must be safe to share across the pipeline's components.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Generate text for the request.
    ///
    /// Errors are recoverable at the call site: the pipeline degrades the
    /// destined artifact to visibly marked placeholder content and keeps
    /// going rather than halting the run.
    async fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_constructors_tag_kinds() {
        assert_eq!(SynthesisRequest::blueprint("x").kind, RequestKind::Blueprint);
        assert_eq!(SynthesisRequest::main_config("x").kind, RequestKind::MainConfig);
        assert_eq!(SynthesisRequest::bdd_suite("x").kind, RequestKind::BddSuite);
    }

    #[test]
    fn test_prompt_embeds_requirement() {
        let request = SynthesisRequest::blueprint("Standard AKS Cluster");
        assert!(request.prompt.contains("Standard AKS Cluster"));
    }

    #[test]
    fn test_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&RequestKind::IntegrationSuite).unwrap();
        assert_eq!(json, "\"integration_suite\"");
        let back: RequestKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RequestKind::IntegrationSuite);
    }
}
