//! The stage sequencer.

use std::fs;
use std::sync::Arc;

use tracing::{info, warn};

use forge_module::{extract_code, Module, ModuleWriter, TERRAFORM_HINTS};
use forge_synth::{SynthesisRequest, Synthesizer};
use forge_verify::{Report, TestRunner, ToolchainConfig, ValidationRunner};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::run::PipelineRun;
use crate::stage::Stage;

const SUMMARY_TEXT_FILE: &str = "pipeline_summary.txt";
const SUMMARY_JSON_FILE: &str = "run_summary.json";

/// Drives the full stage sequence and aggregates all reports.
pub struct PipelineOrchestrator {
    synthesizer: Arc<dyn Synthesizer>,
    validation: ValidationRunner,
    tests: TestRunner,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        toolchain: ToolchainConfig,
        config: PipelineConfig,
    ) -> Self {
        Self {
            validation: ValidationRunner::new(toolchain.clone()),
            tests: TestRunner::new(Arc::clone(&synthesizer), toolchain),
            synthesizer,
            config,
        }
    }

    /// Execute a full run for one requirement.
    ///
    /// Always reaches DONE unless the artifact directory itself is
    /// unusable; check failures are data in the returned run's reports.
    pub async fn run(&self, requirement: &str) -> PipelineResult<PipelineRun> {
        info!("=== Starting module generation pipeline ===");

        fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            PipelineError::ArtifactDir {
                path: self.config.output_dir.clone(),
                source,
            }
        })?;

        let writer = ModuleWriter::new(&self.config.output_dir);
        let mut run = PipelineRun::new(requirement, &self.config.output_dir);

        // DESIGN: blueprint from the raw requirement. Synthesis failure
        // degrades to marked placeholder text; later stages run against
        // degraded content rather than halting the run.
        run.enter(Stage::Design);
        info!("Designing module for: {}", requirement);
        let blueprint = self
            .synthesize_or_mark(SynthesisRequest::blueprint(requirement))
            .await;
        let mut module = Module::new(blueprint);

        // CODE: one synthesis call per module file.
        run.enter(Stage::Code);
        let code_files = [
            ("main.tf", SynthesisRequest::main_config(&module.blueprint)),
            ("variables.tf", SynthesisRequest::variables(&module.blueprint)),
            ("outputs.tf", SynthesisRequest::outputs(&module.blueprint)),
        ];
        for (name, request) in code_files {
            let raw = self.synthesize_or_mark(request).await;
            let code = extract_code(&raw, TERRAFORM_HINTS);
            module.add_file(name, &code);
            writer.write_file(name, &code)?;
        }

        // SECURITY: the three checks are independent; each report is
        // persisted as soon as it exists so a later panic-free failure
        // cannot lose an earlier result.
        run.enter(Stage::Security);
        let report = self.validation.secret_scan(writer.root());
        self.record(&mut run, &writer, report)?;
        let report = self.validation.static_analysis(writer.root());
        self.record(&mut run, &writer, report)?;
        let report = self.validation.policy_check(writer.root());
        self.record(&mut run, &writer, report)?;

        // TEST
        run.enter(Stage::Test);
        let report = self.tests.bdd(&mut module, &writer).await?;
        self.record(&mut run, &writer, report)?;
        let report = self.tests.integration(&mut module, &writer).await?;
        self.record(&mut run, &writer, report)?;

        // DOCS: README is prose, written as synthesized.
        run.enter(Stage::Docs);
        let readme = self
            .synthesize_or_mark(SynthesisRequest::readme(&module.blueprint))
            .await;
        module.add_file("README.md", &readme);
        writer.write_file("README.md", &readme)?;

        run.finish(&module);
        self.persist_summary(&run, &writer)?;

        info!(
            "=== Module development complete, artifacts in {} ===",
            run.artifact_dir.display()
        );
        Ok(run)
    }

    async fn synthesize_or_mark(&self, request: SynthesisRequest) -> String {
        match self.synthesizer.synthesize(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Synthesis failed for {}: {}", request.kind, e);
                format!("# synthesis failed for {}: {}", request.kind, e)
            }
        }
    }

    /// Append a report to the run and persist its body immediately.
    fn record(
        &self,
        run: &mut PipelineRun,
        writer: &ModuleWriter,
        report: Report,
    ) -> PipelineResult<()> {
        info!("[{}] {}", report.status, report.check);
        writer.write_file(report.check.report_file_name(), &report.render())?;
        run.add_report(report);
        Ok(())
    }

    fn persist_summary(&self, run: &PipelineRun, writer: &ModuleWriter) -> PipelineResult<()> {
        writer.write_file(SUMMARY_TEXT_FILE, &run.summary_text())?;
        writer.write_file(SUMMARY_JSON_FILE, &serde_json::to_string_pretty(run)?)?;
        Ok(())
    }
}
