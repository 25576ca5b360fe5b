//! End-to-end pipeline tests against scripted synthesizers and fake or
//! absent external tools.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use forge_pipeline::{PipelineConfig, PipelineOrchestrator, Stage};
use forge_synth::{RequestKind, SimulatedSynthesizer};
use forge_verify::{CheckKind, ReportStatus, ToolchainConfig};

/// Write an executable shell script standing in for an external tool.
fn fake_tool(dir: &Path, name: &str, script: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().to_string()
}

/// A toolchain where no external binary exists at all.
fn absent_toolchain() -> ToolchainConfig {
    ToolchainConfig::new()
        .terraform_bin("no-such-terraform")
        .secret_scan_bin("no-such-secret-scanner")
        .sast_bin("no-such-sast")
        .policy_bin("no-such-policy-engine")
        .compliance_bin("no-such-compliance")
        .go_bin("no-such-go")
}

#[tokio::test]
async fn test_run_completes_with_every_tool_absent() {
    let out = tempfile::tempdir().unwrap();
    let orchestrator = PipelineOrchestrator::new(
        Arc::new(SimulatedSynthesizer::new()),
        absent_toolchain(),
        PipelineConfig::new(out.path()),
    );

    let run = orchestrator.run("Standard AKS Cluster").await.unwrap();

    assert_eq!(run.stage, Stage::Done);
    assert_eq!(run.reports.len(), 5);

    // Every check degraded instead of aborting the run.
    for report in &run.reports {
        assert!(
            matches!(report.status, ReportStatus::Error | ReportStatus::Skipped),
            "{} unexpectedly {}",
            report.check,
            report.status
        );
    }

    // All six report files exist even though nothing could run.
    for check in CheckKind::all() {
        assert!(
            out.path().join(check.report_file_name()).exists(),
            "missing {}",
            check.report_file_name()
        );
    }
    assert!(out.path().join("pipeline_summary.txt").exists());
}

#[tokio::test]
async fn test_aks_scenario_extracts_module_block() {
    let out = tempfile::tempdir().unwrap();
    let orchestrator = PipelineOrchestrator::new(
        Arc::new(SimulatedSynthesizer::new()),
        absent_toolchain(),
        PipelineConfig::new(out.path()),
    );

    let run = orchestrator.run("Standard AKS Cluster").await.unwrap();
    assert_eq!(run.reports.len(), 5);

    // The hinted block was extracted, not the usage example and not the
    // surrounding prose or fences.
    let main_tf = fs::read_to_string(out.path().join("main.tf")).unwrap();
    assert!(main_tf.starts_with("resource \"azurerm_kubernetes_cluster\""));
    assert!(main_tf.ends_with('}'));
    assert!(!main_tf.contains("```"));

    // Remaining module files landed alongside.
    assert!(out.path().join("variables.tf").exists());
    assert!(out.path().join("outputs.tf").exists());
    assert!(out.path().join("README.md").exists());
    assert!(out.path().join("test/security.feature").exists());
    assert!(out.path().join("test/module_test.go").exists());
}

#[tokio::test]
async fn test_secret_scanner_absence_does_not_block_sast() {
    let out = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    let sast = fake_tool(tools.path(), "sast", "echo scanned clean");

    let orchestrator = PipelineOrchestrator::new(
        Arc::new(SimulatedSynthesizer::new()),
        absent_toolchain().sast_bin(sast),
        PipelineConfig::new(out.path()),
    );

    let run = orchestrator.run("Standard AKS Cluster").await.unwrap();

    let secret = run
        .reports
        .iter()
        .find(|r| r.check == CheckKind::SecretScan)
        .unwrap();
    assert_eq!(secret.status, ReportStatus::Error);
    assert!(secret.body.contains("not found"));

    let sast_report = fs::read_to_string(out.path().join("sast_report.txt")).unwrap();
    assert!(sast_report.contains("scanned clean"));
}

#[tokio::test]
async fn test_blueprint_synthesis_failure_degrades_not_aborts() {
    let out = tempfile::tempdir().unwrap();
    let synthesizer =
        Arc::new(SimulatedSynthesizer::new().with_failure(RequestKind::Blueprint));
    let orchestrator = PipelineOrchestrator::new(
        synthesizer,
        absent_toolchain(),
        PipelineConfig::new(out.path()),
    );

    let run = orchestrator.run("Standard AKS Cluster").await.unwrap();

    assert_eq!(run.stage, Stage::Done);
    // Later stages still produced their artifacts from canned content.
    assert!(out.path().join("main.tf").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("run_summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["stage"], "done");
}

#[tokio::test]
async fn test_all_checks_passing_yields_no_failures() {
    let out = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();

    let terraform = fake_tool(
        tools.path(),
        "terraform",
        "case \"$1\" in show) echo '{\"format_version\":\"1.0\"}';; *) exit 0;; esac",
    );
    let toolchain = ToolchainConfig::new()
        .terraform_bin(terraform)
        .secret_scan_bin(fake_tool(tools.path(), "scanner", "echo clean"))
        .sast_bin(fake_tool(tools.path(), "sast", "echo clean"))
        .policy_bin(fake_tool(tools.path(), "sentinel", "echo pass"))
        .compliance_bin(fake_tool(tools.path(), "compliance", "echo pass"))
        .go_bin(fake_tool(
            tools.path(),
            "go",
            "case \"$1\" in mod) touch go.mod;; *) echo ok;; esac",
        ));

    let orchestrator = PipelineOrchestrator::new(
        Arc::new(SimulatedSynthesizer::new()),
        toolchain,
        PipelineConfig::new(out.path()),
    );

    let run = orchestrator.run("Standard AKS Cluster").await.unwrap();

    assert!(!run.has_failures(), "reports: {:?}", run.reports);
    assert!(run
        .reports
        .iter()
        .all(|r| r.status == ReportStatus::Pass));

    // The policy chain materialized its intermediate artifacts.
    assert!(out.path().join("terraform.tfvars").exists());
    assert!(out.path().join("tfplan.json").exists());
    assert!(out.path().join("sentinel.hcl").exists());
}

#[tokio::test]
async fn test_artifact_dir_failure_is_fatal() {
    // A file where the output directory should be makes creation fail.
    let out = tempfile::tempdir().unwrap();
    let blocked = out.path().join("blocked");
    fs::write(&blocked, "not a directory").unwrap();

    let orchestrator = PipelineOrchestrator::new(
        Arc::new(SimulatedSynthesizer::new()),
        absent_toolchain(),
        PipelineConfig::new(blocked.join("artifacts")),
    );

    let result = orchestrator.run("anything").await;
    assert!(result.is_err());
}
