//! Deterministic synthesizer simulator.
//!
//! Returns canned responses keyed by [`RequestKind`], so offline runs and
//! tests exercise the whole pipeline without a model backend. Responses
//! deliberately mix prose with fenced code blocks, matching the texture of
//! real model output, so code extraction is exercised too.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{SynthError, SynthResult};
use crate::traits::{RequestKind, SynthesisRequest, Synthesizer};

/// Scripted synthesizer for offline runs and tests.
pub struct SimulatedSynthesizer {
    responses: HashMap<RequestKind, String>,
    failures: HashSet<RequestKind>,
    captured: Mutex<Vec<SynthesisRequest>>,
}

impl Default for SimulatedSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSynthesizer {
    /// Simulator preloaded with a canned response for every request kind.
    pub fn new() -> Self {
        let mut responses = HashMap::new();
        responses.insert(RequestKind::Blueprint, canned::BLUEPRINT.to_string());
        responses.insert(RequestKind::MainConfig, canned::MAIN_TF.to_string());
        responses.insert(RequestKind::Variables, canned::VARIABLES_TF.to_string());
        responses.insert(RequestKind::Outputs, canned::OUTPUTS_TF.to_string());
        responses.insert(RequestKind::Readme, canned::README.to_string());
        responses.insert(RequestKind::BddSuite, canned::FEATURE.to_string());
        responses.insert(RequestKind::IntegrationSuite, canned::GO_TEST.to_string());
        Self {
            responses,
            failures: HashSet::new(),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Simulator with no canned responses at all.
    pub fn empty() -> Self {
        Self {
            responses: HashMap::new(),
            failures: HashSet::new(),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Override the response for one request kind.
    pub fn with_response(mut self, kind: RequestKind, response: impl Into<String>) -> Self {
        self.responses.insert(kind, response.into());
        self
    }

    /// Make one request kind fail with a backend error.
    pub fn with_failure(mut self, kind: RequestKind) -> Self {
        self.failures.insert(kind);
        self
    }

    /// Requests received so far, for test verification.
    pub fn captured_requests(&self) -> Vec<SynthesisRequest> {
        self.captured
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Synthesizer for SimulatedSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<String> {
        if let Ok(mut calls) = self.captured.lock() {
            calls.push(request.clone());
        }

        if self.failures.contains(&request.kind) {
            return Err(SynthError::Backend(format!(
                "simulated failure for {}",
                request.kind
            )));
        }

        self.responses
            .get(&request.kind)
            .cloned()
            .ok_or_else(|| SynthError::NoCannedResponse(request.kind.to_string()))
    }
}

/// Canned responses shaped after real model output for an AKS module.
mod canned {
    pub const BLUEPRINT: &str = "\
# Module Blueprint: Standard AKS Cluster

The module provisions an Azure Kubernetes Service cluster with a default
node pool, system-assigned identity, and RBAC enabled.

Inputs: cluster_name, resource_group_name, location, node_count.
Outputs: cluster id, kube_config.

Resources: azurerm_kubernetes_cluster with default_node_pool and identity
blocks.";

    pub const MAIN_TF: &str = "\
Here is the module implementation. A minimal usage example first:

```hcl
module \"aks\" {
  source = \"./\"
}
```

And the module itself:

```hcl
resource \"azurerm_kubernetes_cluster\" \"main\" {
  name                = var.cluster_name
  location            = var.location
  resource_group_name = var.resource_group_name
  dns_prefix          = var.cluster_name

  default_node_pool {
    name       = \"default\"
    node_count = var.node_count
    vm_size    = \"Standard_D2_v2\"
  }

  identity {
    type = \"SystemAssigned\"
  }

  role_based_access_control_enabled = true
}
```";

    pub const VARIABLES_TF: &str = "\
```hcl
variable \"cluster_name\" {
  description = \"Name of the AKS cluster\"
  type        = string
}

variable \"resource_group_name\" {
  description = \"Resource group to deploy into\"
  type        = string
}

variable \"location\" {
  description = \"Azure region\"
  type        = string
  default     = \"westeurope\"
}

variable \"node_count\" {
  description = \"Number of nodes in the default pool\"
  type        = number
  default     = 3
}
```";

    pub const OUTPUTS_TF: &str = "\
```hcl
output \"cluster_id\" {
  description = \"The AKS cluster ID\"
  value       = azurerm_kubernetes_cluster.main.id
}

output \"kube_config\" {
  description = \"Raw kubeconfig for the cluster\"
  value       = azurerm_kubernetes_cluster.main.kube_config_raw
  sensitive   = true
}
```";

    pub const README: &str = "\
# AKS Cluster Module

Provisions an Azure Kubernetes Service cluster with RBAC enabled and a
system-assigned managed identity.

## Usage

    module \"aks\" {
      source              = \"./\"
      cluster_name        = \"my-cluster\"
      resource_group_name = \"my-rg\"
      location            = \"westeurope\"
    }

## Inputs

| Name | Description | Default |
|------|-------------|---------|
| cluster_name | Name of the AKS cluster | n/a |
| resource_group_name | Resource group to deploy into | n/a |
| location | Azure region | westeurope |
| node_count | Nodes in the default pool | 3 |
";

    pub const FEATURE: &str = "\
The following scenarios cover the baseline security posture:

```gherkin
Feature: AKS cluster security baseline

  Scenario: RBAC must be enabled
    Given I have azurerm_kubernetes_cluster defined
    Then it must contain role_based_access_control_enabled
    And its value must be true

  Scenario: Identity must be system assigned
    Given I have azurerm_kubernetes_cluster defined
    Then it must contain identity
```";

    pub const GO_TEST: &str = "\
```go
package test

import (
\t\"testing\"

\t\"github.com/gruntwork-io/terratest/modules/terraform\"
\t\"github.com/stretchr/testify/assert\"
)

func TestAksClusterDeployment(t *testing.T) {
\tt.Parallel()

\tterraformOptions := &terraform.Options{
\t\tTerraformDir: \"../\",
\t\tVars: map[string]interface{}{
\t\t\t\"cluster_name\":        \"aks-test\",
\t\t\t\"resource_group_name\": \"rg-aks-test\",
\t\t\t\"location\":            \"westeurope\",
\t\t},
\t}

\tdefer terraform.Destroy(t, terraformOptions)
\tterraform.InitAndApply(t, terraformOptions)

\tclusterID := terraform.Output(t, terraformOptions, \"cluster_id\")
\tassert.NotEmpty(t, clusterID)
}
```";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_response_per_kind() {
        let sim = SimulatedSynthesizer::new();
        let text = sim
            .synthesize(&SynthesisRequest::main_config("bp"))
            .await
            .unwrap();
        assert!(text.contains("azurerm_kubernetes_cluster"));
    }

    #[tokio::test]
    async fn test_override_response() {
        let sim = SimulatedSynthesizer::new()
            .with_response(RequestKind::Readme, "# Custom");
        let text = sim
            .synthesize(&SynthesisRequest::readme("bp"))
            .await
            .unwrap();
        assert_eq!(text, "# Custom");
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let sim = SimulatedSynthesizer::new().with_failure(RequestKind::Blueprint);
        let result = sim.synthesize(&SynthesisRequest::blueprint("req")).await;
        assert!(matches!(result, Err(SynthError::Backend(_))));
    }

    #[tokio::test]
    async fn test_empty_simulator_reports_missing_response() {
        let sim = SimulatedSynthesizer::empty();
        let result = sim.synthesize(&SynthesisRequest::outputs("bp")).await;
        assert!(matches!(result, Err(SynthError::NoCannedResponse(_))));
    }

    #[tokio::test]
    async fn test_requests_are_captured() {
        let sim = SimulatedSynthesizer::new();
        let _ = sim.synthesize(&SynthesisRequest::blueprint("req")).await;
        let _ = sim.synthesize(&SynthesisRequest::readme("bp")).await;

        let captured = sim.captured_requests();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].kind, RequestKind::Blueprint);
        assert_eq!(captured[1].kind, RequestKind::Readme);
    }
}
