//! # forge_verify
//!
//! Validation and test execution against a generated module.
//!
//! Every check translates external tool outcomes into a [`Report`] with a
//! four-state status (PASS / FAIL / ERROR / SKIPPED). Checks never abort
//! the pipeline: a missing tool degrades to SKIPPED or ERROR content, a
//! tool that reports findings becomes a FAIL, and only the orchestrator
//! decides what to do with the aggregate.
//!
//! - [`ValidationRunner`] — secret scanning, static analysis, and the
//!   multi-step policy-as-code chain (tfvars → init → plan → show →
//!   policy config → apply).
//! - [`TestRunner`] — behavior-driven and integration test flows, each
//!   synthesizing its suite, persisting it under `test/`, and executing
//!   it.

pub mod report;
pub mod testing;
pub mod toolchain;
pub mod validation;

pub use report::{CheckKind, Report, ReportStatus};
pub use testing::TestRunner;
pub use toolchain::ToolchainConfig;
pub use validation::ValidationRunner;
