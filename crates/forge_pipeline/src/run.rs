//! Run aggregate: everything one pipeline execution produced.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forge_module::Module;
use forge_verify::{Report, ReportStatus};

use crate::stage::Stage;

/// Top-level result of one generation-validation run.
///
/// Created at run start, reports appended as stages complete, finalized
/// when the terminal stage is reached. A run always terminates in
/// [`Stage::Done`]; whether checks passed is visible in the reports, not
/// in the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: Uuid,
    pub requirement: String,
    pub artifact_dir: PathBuf,
    pub stage: Stage,
    pub reports: Vec<Report>,
    /// Names of module files written, in the order stages added them
    pub artifacts: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(requirement: impl Into<String>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            requirement: requirement.into(),
            artifact_dir: artifact_dir.into(),
            stage: Stage::Design,
            reports: Vec::new(),
            artifacts: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Advance to the next stage.
    pub fn enter(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn add_report(&mut self, report: Report) {
        self.reports.push(report);
    }

    /// Finalize the run: record the artifact set and reach DONE.
    pub fn finish(&mut self, module: &Module) {
        self.artifacts = module.files().iter().map(|f| f.name.clone()).collect();
        self.stage = Stage::Done;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Whether any check failed or errored.
    ///
    /// The run itself still terminates in DONE; this is the aggregate
    /// signal for callers that want to gate on check outcomes.
    pub fn has_failures(&self) -> bool {
        self.reports
            .iter()
            .any(|r| matches!(r.status, ReportStatus::Fail | ReportStatus::Error))
    }

    /// Plain-text summary persisted next to the reports.
    pub fn summary_text(&self) -> String {
        let mut summary = format!(
            "Pipeline run {}\nRequirement: {}\nStage: {}\n\nReports:\n",
            self.id, self.requirement, self.stage
        );
        for report in &self.reports {
            summary.push_str(&format!("  [{}] {}\n", report.status, report.check));
        }
        summary.push_str("\nArtifacts:\n");
        for name in &self.artifacts {
            summary.push_str(&format!("  {}\n", name));
        }
        summary
    }
}
