//! TerraForge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Run reached DONE (check outcomes are data, not process failures)
//! - 1: Unrecoverable setup error (e.g. artifact directory unusable)
//! - 2: Invalid arguments
//! - 3: Failing reports, only with --check-gate

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forge_pipeline::{PipelineConfig, PipelineOrchestrator};
use forge_synth::{GeminiSynthesizer, SimulatedSynthesizer, SynthConfig, Synthesizer};
use forge_verify::ToolchainConfig;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const CHECK_FAILURES: u8 = 3;
}

#[derive(Parser)]
#[command(
    name = "terraforge",
    version,
    about = "Generates a Terraform module from requirements and validates it end to end"
)]
struct Cli {
    /// High-level requirements for the module
    #[arg(long)]
    requirements: String,

    /// Directory the artifact bundle is written into
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Use the offline simulator instead of the Gemini backend
    #[arg(long)]
    simulate: bool,

    /// Synthesizer model override
    #[arg(long)]
    model: Option<String>,

    /// Directory of policy sources for the policy-as-code check
    #[arg(long)]
    policy_source: Option<PathBuf>,

    /// Exit non-zero when any check reports FAIL or ERROR
    #[arg(long)]
    check_gate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("forge_pipeline=info".parse().unwrap())
                .add_directive("forge_verify=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let cli = Cli::parse();

    let synthesizer = build_synthesizer(&cli);

    let mut toolchain = ToolchainConfig::new();
    if let Some(source) = &cli.policy_source {
        toolchain = toolchain.policy_source(source.clone());
    }

    let orchestrator = PipelineOrchestrator::new(
        synthesizer,
        toolchain,
        PipelineConfig::new(&cli.output_dir),
    );

    match orchestrator.run(&cli.requirements).await {
        Ok(run) => {
            println!("{}", run.summary_text());
            if cli.check_gate && run.has_failures() {
                ExitCode::from(ExitCodes::CHECK_FAILURES)
            } else {
                ExitCode::from(ExitCodes::SUCCESS)
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            ExitCode::from(ExitCodes::GENERAL_ERROR)
        }
    }
}

/// Pick the synthesizer backend.
///
/// The API key is read from the environment here and nowhere else; the
/// pipeline crates never touch the environment. Without a key the run
/// degrades to the offline simulator with a warning rather than failing.
fn build_synthesizer(cli: &Cli) -> Arc<dyn Synthesizer> {
    if cli.simulate {
        return Arc::new(SimulatedSynthesizer::new());
    }

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let mut config = SynthConfig::new(api_key);
    if let Some(model) = &cli.model {
        config = config.model(model.clone());
    }

    match GeminiSynthesizer::new(config) {
        Ok(gemini) => Arc::new(gemini),
        Err(_) => {
            warn!("No GEMINI_API_KEY set, falling back to the offline simulator");
            Arc::new(SimulatedSynthesizer::new())
        }
    }
}
