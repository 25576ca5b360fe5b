//! # forge_synth
//!
//! Content synthesis for TerraForge.
//!
//! The pipeline treats the synthesizer as an opaque capability: a prompt
//! goes in, generated text comes out. Whether that text comes from a
//! remote model or a local simulator is irrelevant to the rest of the
//! system, so both live behind the [`Synthesizer`] trait:
//!
//! - [`GeminiSynthesizer`] calls the Gemini `generateContent` REST API
//!   with bounded retries.
//! - [`SimulatedSynthesizer`] returns canned responses selected by
//!   [`RequestKind`], for offline runs and deterministic tests.

pub mod error;
pub mod gemini;
pub mod sim;
pub mod traits;

pub use error::{SynthError, SynthResult};
pub use gemini::{GeminiSynthesizer, SynthConfig};
pub use sim::SimulatedSynthesizer;
pub use traits::{RequestKind, SynthesisRequest, Synthesizer};
