//! # forge_pipeline
//!
//! The stage sequencer that drives a full generation-validation run:
//! DESIGN → CODE → SECURITY → TEST → DOCS → DONE.
//!
//! Stage transitions are unconditional. Failures inside a stage become
//! report content, never aborts, so a run always reaches DONE with a
//! consistent artifact set: partial artifacts and partial reports beat no
//! artifacts at all. The only fatal condition is a filesystem that won't
//! accept the artifacts in the first place.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod run;
pub mod stage;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::PipelineOrchestrator;
pub use run::PipelineRun;
pub use stage::Stage;
