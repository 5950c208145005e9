//! Error types for color generation.
//!
//! Most of these never reach a caller of [`crate::ColorService::generate`]:
//! deadline expiry, cancellation and worker faults are folded into
//! [`crate::AggregateResult::warning`]. They surface directly only from the
//! lower-level building blocks ([`crate::GenerationPipeline::fill`],
//! [`crate::Chunk::error`]) and from configuration validation.
//!
//! ## Error Cases
//! - `GenerationTimeout`: a pipeline's deadline elapsed mid-sequence.
//! - `Cancelled`: a pipeline observed its cancellation token mid-sequence.
//! - `TaskFault`: a worker panicked while synthesizing colors.
//! - `InvalidSeed`: a seed color could not be parsed as hex.
//! - `InvalidOptions`: generator options failed validation.

use thiserror::Error;

/// A result type defaulting to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `hexbot` can produce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The deadline elapsed before every requested color was produced.
    #[error("generation timed out after {produced} of {requested} colors")]
    GenerationTimeout { produced: usize, requested: usize },

    /// Cancellation was requested before every requested color was produced.
    #[error("generation cancelled after {produced} of {requested} colors")]
    Cancelled { produced: usize, requested: usize },

    /// A worker task failed unexpectedly. The fault was trapped at the task
    /// boundary.
    #[error("worker {worker} faulted: {reason}")]
    TaskFault { worker: usize, reason: String },

    /// The seed is not a three or six digit hex color.
    #[error("invalid seed color: {seed:?}")]
    InvalidSeed { seed: String },

    /// Generator options failed validation.
    #[error("invalid generator options: {reason}")]
    InvalidOptions { reason: String },
}
