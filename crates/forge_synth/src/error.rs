//! Error types for the synthesizer module.

use thiserror::Error;

/// Result type alias for synthesizer operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur during content synthesis.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("synthesizer backend not configured")]
    NotConfigured,

    #[error("synthesis backend error: {0}")]
    Backend(String),

    #[error("no canned response for request kind: {0}")]
    NoCannedResponse(String),
}
