use thiserror::Error;

use crate::llm_client::GenerationServiceError;
use crate::optimization::models::IterationRecord;

/// Failure of an analyze or optimize call. Each kind is distinguishable so the
/// caller can retry (`GenerationService`, `OptimizationFailed`) or reject
/// (`InvalidInput`) without string matching.
#[derive(Debug, Error)]
pub enum OptimizationError {
    /// Missing or unusable input. Raised before any remote call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A generation call outside the loop failed (analysis, single evaluation).
    #[error("Generation service error: {0}")]
    GenerationService(#[from] GenerationServiceError),

    /// A generation call inside the loop failed. The run produced no result;
    /// the partial history is carried for diagnostics only.
    #[error("Optimization failed at iteration {iteration}: {source}")]
    OptimizationFailed {
        iteration: u32,
        partial_history: Vec<IterationRecord>,
        #[source]
        source: GenerationServiceError,
    },

    /// Cooperative cancellation observed between iterations.
    #[error("Optimization cancelled after {completed_iterations} completed iterations")]
    Cancelled { completed_iterations: u32 },
}

impl OptimizationError {
    /// Whether re-running the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OptimizationError::GenerationService(_) | OptimizationError::OptimizationFailed { .. }
        )
    }
}
