//! External toolchain configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Names and settings of the external verification tools.
///
/// Immutable once built; constructed at startup and passed by reference
/// into the runners. Binary names are plain strings so deployments can
/// point at equivalents (e.g. `tofu` for `terraform`) without code
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Infrastructure-as-code CLI (init / plan / show)
    pub terraform_bin: String,
    /// Secret-detection CLI, takes a directory argument
    pub secret_scan_bin: String,
    /// Static-analysis CLI with compact machine-readable output
    pub sast_bin: String,
    /// Policy-evaluation binary (`apply -config <file> -param k=v`)
    pub policy_bin: String,
    /// Compliance-testing CLI (`-f <features dir> -p <plan file>`)
    pub compliance_bin: String,
    /// Integration test runner
    pub go_bin: String,
    /// Directory of policy sources referenced by the policy config
    pub policy_source: PathBuf,
    /// Binary plan artifact name, relative to the module directory
    pub plan_file: String,
    /// JSON plan artifact name, relative to the module directory
    pub plan_json_file: String,
    /// Bound for terraform init/plan/show steps
    pub terraform_timeout_secs: u64,
    /// Bound for scanners and the policy apply
    pub scan_timeout_secs: u64,
    /// Bound for the integration suite; provisioning real infrastructure
    /// is long-running, so this is generous but finite
    pub integration_timeout_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            terraform_bin: "terraform".to_string(),
            secret_scan_bin: "detect-secrets".to_string(),
            sast_bin: "checkov".to_string(),
            policy_bin: "sentinel".to_string(),
            compliance_bin: "terraform-compliance".to_string(),
            go_bin: "go".to_string(),
            policy_source: PathBuf::from("policies"),
            plan_file: "tfplan.binary".to_string(),
            plan_json_file: "tfplan.json".to_string(),
            terraform_timeout_secs: 600,
            scan_timeout_secs: 300,
            integration_timeout_secs: 1800,
        }
    }
}

impl ToolchainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terraform_bin(mut self, bin: impl Into<String>) -> Self {
        self.terraform_bin = bin.into();
        self
    }

    pub fn secret_scan_bin(mut self, bin: impl Into<String>) -> Self {
        self.secret_scan_bin = bin.into();
        self
    }

    pub fn sast_bin(mut self, bin: impl Into<String>) -> Self {
        self.sast_bin = bin.into();
        self
    }

    pub fn policy_bin(mut self, bin: impl Into<String>) -> Self {
        self.policy_bin = bin.into();
        self
    }

    pub fn compliance_bin(mut self, bin: impl Into<String>) -> Self {
        self.compliance_bin = bin.into();
        self
    }

    pub fn go_bin(mut self, bin: impl Into<String>) -> Self {
        self.go_bin = bin.into();
        self
    }

    pub fn policy_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_source = path.into();
        self
    }

    pub fn integration_timeout(mut self, seconds: u64) -> Self {
        self.integration_timeout_secs = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolchainConfig::default();
        assert_eq!(config.terraform_bin, "terraform");
        assert_eq!(config.integration_timeout_secs, 1800);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ToolchainConfig::new()
            .terraform_bin("tofu")
            .integration_timeout(60);
        assert_eq!(config.terraform_bin, "tofu");
        assert_eq!(config.integration_timeout_secs, 60);
    }
}
