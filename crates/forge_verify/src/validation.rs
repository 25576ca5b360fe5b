//! Security validation checks against a generated module.
//!
//! Three independent checks: secret scanning, static analysis, and
//! policy-as-code. Failure of one never prevents the others from running;
//! each is internally sequential.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use forge_tools::{ToolInvocation, ToolInvoker, ToolResult};

use crate::report::{CheckKind, Report};
use crate::toolchain::ToolchainConfig;

/// Runs the security checks and translates tool outcomes into reports.
pub struct ValidationRunner {
    invoker: ToolInvoker,
    config: ToolchainConfig,
}

impl ValidationRunner {
    pub fn new(config: ToolchainConfig) -> Self {
        Self {
            invoker: ToolInvoker::new(),
            config,
        }
    }

    /// Scan the module directory for committed secrets.
    pub fn secret_scan(&self, module_dir: &Path) -> Report {
        info!("Running secret scan on {}", module_dir.display());

        let invocation = ToolInvocation::new(&self.config.secret_scan_bin)
            .arg("scan")
            .arg(module_dir.to_string_lossy())
            .timeout_secs(self.config.scan_timeout_secs);

        match self.invoker.run(&invocation) {
            ToolResult::Completed {
                exit_code: 0,
                stdout,
                ..
            } => Report::pass(CheckKind::SecretScan, stdout),
            result @ ToolResult::Completed { .. } => {
                Report::fail(CheckKind::SecretScan, result.combined_output())
            }
            ToolResult::NotFound => Report::error(
                CheckKind::SecretScan,
                format!(
                    "secret scanning tool '{}' not found",
                    self.config.secret_scan_bin
                ),
            ),
            ToolResult::TimedOut { seconds } => Report::error(
                CheckKind::SecretScan,
                format!("secret scan timed out after {seconds}s"),
            ),
            ToolResult::Crashed { message } => Report::error(CheckKind::SecretScan, message),
        }
    }

    /// Run static analysis over the module directory.
    ///
    /// The tool reports findings on stdout and via a non-zero exit at the
    /// same time, so the body always carries the full stdout for audit.
    pub fn static_analysis(&self, module_dir: &Path) -> Report {
        info!("Running static analysis on {}", module_dir.display());

        let invocation = ToolInvocation::new(&self.config.sast_bin)
            .arg("-d")
            .arg(module_dir.to_string_lossy())
            .arg("--compact")
            .timeout_secs(self.config.scan_timeout_secs);

        match self.invoker.run(&invocation) {
            ToolResult::Completed {
                exit_code,
                stdout,
                stderr,
            } => {
                let mut body = stdout;
                if exit_code != 0 && !stderr.is_empty() {
                    body.push('\n');
                    body.push_str(&stderr);
                }
                if exit_code == 0 {
                    Report::pass(CheckKind::Sast, body)
                } else {
                    Report::fail(CheckKind::Sast, body)
                }
            }
            ToolResult::NotFound => Report::error(
                CheckKind::Sast,
                format!("static analysis tool '{}' not found", self.config.sast_bin),
            ),
            ToolResult::TimedOut { seconds } => Report::error(
                CheckKind::Sast,
                format!("static analysis timed out after {seconds}s"),
            ),
            ToolResult::Crashed { message } => Report::error(CheckKind::Sast, message),
        }
    }

    /// Evaluate the planned change against policy-as-code rules.
    ///
    /// A multi-step chain with intermediate artifacts; any step's failure
    /// short-circuits the rest and the report names the failed step.
    pub fn policy_check(&self, module_dir: &Path) -> Report {
        self.policy_chain(module_dir).unwrap_or_else(|report| report)
    }

    fn policy_chain(&self, module_dir: &Path) -> Result<Report, Report> {
        // Planning is expensive; do not start the chain when the engine
        // that would consume its output is not installed.
        if !self.invoker.probe(&self.config.policy_bin) {
            info!(
                "Policy engine '{}' not available, skipping policy check",
                self.config.policy_bin
            );
            return Ok(Report::skipped(
                CheckKind::Policy,
                format!("policy engine binary '{}' not found", self.config.policy_bin),
            ));
        }

        info!("Running policy check on {}", module_dir.display());

        // Placeholder values keep the planner from blocking on input.
        let variables_tf =
            fs::read_to_string(module_dir.join("variables.tf")).unwrap_or_default();
        fs::write(
            module_dir.join("terraform.tfvars"),
            placeholder_tfvars(&variables_tf),
        )
        .map_err(|e| self.chain_error("write terraform.tfvars", &e.to_string()))?;

        self.run_chain_step(
            "terraform init",
            &self
                .terraform(module_dir)
                .args(["init", "-input=false"]),
        )?;

        self.run_chain_step(
            "terraform plan",
            &self
                .terraform(module_dir)
                .arg("plan")
                .arg(format!("-out={}", self.config.plan_file))
                .arg("-input=false"),
        )?;

        let show = self.run_chain_step(
            "terraform show",
            &self
                .terraform(module_dir)
                .arg("show")
                .arg("-json")
                .arg(&self.config.plan_file),
        )?;
        fs::write(
            module_dir.join(&self.config.plan_json_file),
            show.combined_output(),
        )
        .map_err(|e| self.chain_error("write plan json", &e.to_string()))?;

        fs::write(module_dir.join("sentinel.hcl"), self.policy_config())
            .map_err(|e| self.chain_error("write sentinel.hcl", &e.to_string()))?;

        let apply = ToolInvocation::new(&self.config.policy_bin)
            .args(["apply", "-config", "sentinel.hcl"])
            .arg("-param")
            .arg(format!("plan={}", self.config.plan_json_file))
            .current_dir(module_dir)
            .timeout_secs(self.config.scan_timeout_secs);

        Ok(match self.invoker.run(&apply) {
            ToolResult::Completed {
                exit_code: 0,
                stdout,
                ..
            } => Report::pass(CheckKind::Policy, stdout),
            result @ ToolResult::Completed { .. } => {
                Report::fail(CheckKind::Policy, result.combined_output())
            }
            ToolResult::NotFound => Report::error(
                CheckKind::Policy,
                format!("policy engine binary '{}' not found", self.config.policy_bin),
            ),
            ToolResult::TimedOut { seconds } => Report::error(
                CheckKind::Policy,
                format!("policy apply timed out after {seconds}s"),
            ),
            ToolResult::Crashed { message } => Report::error(CheckKind::Policy, message),
        })
    }

    fn terraform(&self, module_dir: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.config.terraform_bin)
            .current_dir(module_dir)
            .timeout_secs(self.config.terraform_timeout_secs)
    }

    /// Run one chain step; anything short of a zero exit fails the chain.
    fn run_chain_step(
        &self,
        step: &str,
        invocation: &ToolInvocation,
    ) -> Result<ToolResult, Report> {
        debug!("Policy chain step: {step}");
        let result = self.invoker.run(invocation);
        match &result {
            ToolResult::Completed { exit_code: 0, .. } => Ok(result),
            ToolResult::Completed { exit_code, .. } => Err(self.chain_error(
                step,
                &format!("exit code {}\n{}", exit_code, result.combined_output()),
            )),
            ToolResult::NotFound => {
                Err(self.chain_error(step, &format!("'{}' not found", invocation.program)))
            }
            ToolResult::TimedOut { seconds } => {
                Err(self.chain_error(step, &format!("timed out after {seconds}s")))
            }
            ToolResult::Crashed { message } => Err(self.chain_error(step, message)),
        }
    }

    fn chain_error(&self, step: &str, detail: &str) -> Report {
        Report::error(
            CheckKind::Policy,
            format!("policy chain failed at {step}: {detail}"),
        )
    }

    fn policy_config(&self) -> String {
        format!(
            "policy \"terraform\" {{\n  source            = \"{}\"\n  enforcement_level = \"advisory\"\n}}\n\nparam \"plan\" {{\n  value = \"{}\"\n}}\n",
            self.config.policy_source.display(),
            self.config.plan_json_file
        )
    }
}

fn variable_regex() -> &'static Regex {
    static VARIABLE: OnceLock<Regex> = OnceLock::new();
    VARIABLE.get_or_init(|| {
        Regex::new(r#"variable\s+"([^"]+)""#).expect("variable regex compiles")
    })
}

/// Build placeholder variable assignments from variables.tf content.
///
/// Values only need to let the plan run non-interactively; a typed guess
/// covers numbers and booleans, everything else is a quoted string.
fn placeholder_tfvars(variables_tf: &str) -> String {
    let declarations: Vec<(usize, &str)> = variable_regex()
        .captures_iter(variables_tf)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.start(), name.as_str()))
        })
        .collect();

    let mut tfvars = String::new();
    for (i, (start, name)) in declarations.iter().enumerate() {
        let end = declarations
            .get(i + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(variables_tf.len());
        let block = &variables_tf[*start..end];

        let value = if block.contains("number") {
            "1"
        } else if block.contains("bool") {
            "true"
        } else {
            "\"placeholder\""
        };
        tfvars.push_str(&format!("{name} = {value}\n"));
    }
    tfvars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Write an executable shell script standing in for an external tool.
    fn fake_tool(dir: &Path, name: &str, script: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    fn module_dir_with_variables() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("variables.tf"),
            "variable \"cluster_name\" {\n  type = string\n}\n\nvariable \"node_count\" {\n  type = number\n}\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_placeholder_tfvars_typed_guesses() {
        let tfvars = placeholder_tfvars(
            "variable \"name\" { type = string }\nvariable \"count\" { type = number }\nvariable \"enabled\" { type = bool }\n",
        );
        assert!(tfvars.contains("name = \"placeholder\""));
        assert!(tfvars.contains("count = 1"));
        assert!(tfvars.contains("enabled = true"));
    }

    #[test]
    fn test_placeholder_tfvars_empty_input() {
        assert!(placeholder_tfvars("").is_empty());
    }

    #[test]
    fn test_secret_scan_missing_tool_is_error() {
        let config = ToolchainConfig::new().secret_scan_bin("definitely-not-a-real-scanner");
        let runner = ValidationRunner::new(config);

        let report = runner.secret_scan(Path::new("/tmp"));
        assert_eq!(report.status, crate::ReportStatus::Error);
        assert!(report.body.contains("not found"));
    }

    #[test]
    fn test_secret_scan_clean_exit_passes() {
        let tools = tempfile::tempdir().unwrap();
        let scanner = fake_tool(tools.path(), "scanner", "echo no secrets detected");
        let runner = ValidationRunner::new(ToolchainConfig::new().secret_scan_bin(scanner));

        let report = runner.secret_scan(Path::new("/tmp"));
        assert_eq!(report.status, crate::ReportStatus::Pass);
        assert!(report.body.contains("no secrets detected"));
    }

    #[test]
    fn test_secret_scan_findings_fail() {
        let tools = tempfile::tempdir().unwrap();
        let scanner = fake_tool(tools.path(), "scanner", "echo AWS key in main.tf; exit 1");
        let runner = ValidationRunner::new(ToolchainConfig::new().secret_scan_bin(scanner));

        let report = runner.secret_scan(Path::new("/tmp"));
        assert_eq!(report.status, crate::ReportStatus::Fail);
        assert!(report.body.contains("AWS key"));
    }

    #[test]
    fn test_static_analysis_body_keeps_stdout_on_failure() {
        let tools = tempfile::tempdir().unwrap();
        let sast = fake_tool(
            tools.path(),
            "sast",
            "echo CKV_AZURE_4 failed; echo details >&2; exit 1",
        );
        let runner = ValidationRunner::new(ToolchainConfig::new().sast_bin(sast));

        let report = runner.static_analysis(Path::new("/tmp"));
        assert_eq!(report.status, crate::ReportStatus::Fail);
        assert!(report.body.contains("CKV_AZURE_4"));
        assert!(report.body.contains("details"));
    }

    #[test]
    fn test_policy_check_skips_when_engine_absent() {
        let module = module_dir_with_variables();
        let config = ToolchainConfig::new()
            .policy_bin("definitely-not-a-real-policy-engine")
            // terraform must never be needed when the chain is skipped
            .terraform_bin("also-not-a-real-tool");
        let runner = ValidationRunner::new(config);

        let report = runner.policy_check(module.path());
        assert_eq!(report.status, crate::ReportStatus::Skipped);
        assert!(report.body.contains("not found"));
        assert!(!module.path().join("terraform.tfvars").exists());
    }

    #[test]
    fn test_policy_chain_happy_path() {
        let module = module_dir_with_variables();
        let tools = tempfile::tempdir().unwrap();
        let terraform = fake_tool(
            tools.path(),
            "terraform",
            "case \"$1\" in show) echo '{\"format_version\":\"1.0\"}';; *) exit 0;; esac",
        );
        let sentinel = fake_tool(tools.path(), "sentinel", "echo policy passed");

        let runner = ValidationRunner::new(
            ToolchainConfig::new()
                .terraform_bin(terraform)
                .policy_bin(sentinel),
        );

        let report = runner.policy_check(module.path());
        assert_eq!(report.status, crate::ReportStatus::Pass);
        assert!(report.body.contains("policy passed"));

        // Intermediate artifacts materialized along the chain
        let tfvars = fs::read_to_string(module.path().join("terraform.tfvars")).unwrap();
        assert!(tfvars.contains("cluster_name = \"placeholder\""));
        assert!(tfvars.contains("node_count = 1"));
        assert!(module.path().join("tfplan.json").exists());
        assert!(module.path().join("sentinel.hcl").exists());
    }

    #[test]
    fn test_policy_chain_short_circuits_on_plan_failure() {
        let module = module_dir_with_variables();
        let tools = tempfile::tempdir().unwrap();
        let terraform = fake_tool(
            tools.path(),
            "terraform",
            "case \"$1\" in plan) echo provider error >&2; exit 1;; *) exit 0;; esac",
        );
        let sentinel = fake_tool(tools.path(), "sentinel", "exit 0");

        let runner = ValidationRunner::new(
            ToolchainConfig::new()
                .terraform_bin(terraform)
                .policy_bin(sentinel),
        );

        let report = runner.policy_check(module.path());
        assert_eq!(report.status, crate::ReportStatus::Error);
        assert!(report.body.contains("terraform plan"));
        assert!(report.body.contains("provider error"));
        // show never ran, so no JSON plan was materialized
        assert!(!module.path().join("tfplan.json").exists());
    }

    #[test]
    fn test_policy_config_references_source_and_plan() {
        let runner = ValidationRunner::new(
            ToolchainConfig::new().policy_source(PathBuf::from("company-policies")),
        );
        let config = runner.policy_config();
        assert!(config.contains("company-policies"));
        assert!(config.contains("tfplan.json"));
    }
}
