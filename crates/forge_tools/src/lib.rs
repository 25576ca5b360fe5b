//! # forge_tools
//!
//! External tool invocation for TerraForge.
//!
//! Verification tools (terraform, secret scanners, policy engines) are
//! independent host processes that fail in independent ways. This crate
//! runs them and classifies every outcome into a [`ToolResult`]:
//!
//! - `Completed` — the process ran and exited, with any exit code. A
//!   non-zero code is data for the caller, not an error: scanners use it
//!   to mean "findings present".
//! - `NotFound` — the binary is not installed.
//! - `TimedOut` — the configured wall-clock bound elapsed and the child
//!   was killed.
//! - `Crashed` — the invocation itself failed unexpectedly.
//!
//! [`ToolInvoker::run`] never returns an error and never panics, so
//! callers are forced to handle all four outcomes explicitly.

pub mod invocation;
pub mod invoker;

pub use invocation::ToolInvocation;
pub use invoker::{ToolInvoker, ToolResult};
