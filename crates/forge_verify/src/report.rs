//! Normalized check results.

use serde::{Deserialize, Serialize};

/// Status of one validation or test check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// The tool ran and found nothing
    Pass,
    /// The tool ran and reported findings (or the suite failed)
    Fail,
    /// The check could not run to a verdict
    Error,
    /// The check was not attempted
    Skipped,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pass => "PASS",
            ReportStatus::Fail => "FAIL",
            ReportStatus::Error => "ERROR",
            ReportStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The checks the pipeline runs against a generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    SecretScan,
    Sast,
    Policy,
    Bdd,
    Integration,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::SecretScan => "secret-scan",
            CheckKind::Sast => "sast",
            CheckKind::Policy => "policy",
            CheckKind::Bdd => "bdd",
            CheckKind::Integration => "integration",
        }
    }

    /// File name the report body is persisted under.
    pub fn report_file_name(&self) -> &'static str {
        match self {
            CheckKind::SecretScan => "secret_scan_report.txt",
            CheckKind::Sast => "sast_report.txt",
            CheckKind::Policy => "policy_check_report.txt",
            CheckKind::Bdd => "bdd_report.txt",
            CheckKind::Integration => "integration_report.txt",
        }
    }

    pub fn all() -> [CheckKind; 5] {
        [
            CheckKind::SecretScan,
            CheckKind::Sast,
            CheckKind::Policy,
            CheckKind::Bdd,
            CheckKind::Integration,
        ]
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One named check result, persisted verbatim to the artifact directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub check: CheckKind,
    pub status: ReportStatus,
    pub body: String,
}

impl Report {
    pub fn pass(check: CheckKind, body: impl Into<String>) -> Self {
        Self {
            check,
            status: ReportStatus::Pass,
            body: body.into(),
        }
    }

    pub fn fail(check: CheckKind, body: impl Into<String>) -> Self {
        Self {
            check,
            status: ReportStatus::Fail,
            body: body.into(),
        }
    }

    pub fn error(check: CheckKind, body: impl Into<String>) -> Self {
        Self {
            check,
            status: ReportStatus::Error,
            body: body.into(),
        }
    }

    pub fn skipped(check: CheckKind, body: impl Into<String>) -> Self {
        Self {
            check,
            status: ReportStatus::Skipped,
            body: body.into(),
        }
    }

    /// Rendered form written to disk: a status header, then the body.
    pub fn render(&self) -> String {
        format!("[{}] {}\n\n{}\n", self.status, self.check, self.body)
    }
}
