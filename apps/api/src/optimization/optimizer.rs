//! Cover-letter optimization loop: bounded optimize → evaluate → check cycle.
//!
//! Flow per pass: cancellation check → optimize → evaluate → record → stop test.
//! Stops when the score reaches the target (inclusive) or the iteration budget is
//! spent; at least one rewrite always happens. After the loop the final letter is
//! checked for consistency against the profile (advisory only).
//!
//! All run state (current letter, history) is local to one call. Concurrent runs
//! share nothing but the generator, which is treated as stateless and reentrant.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::GenerationServiceError;
use crate::optimization::analyzer::ProfileAnalyzer;
use crate::optimization::consistency::{check, check_detailed};
use crate::optimization::errors::OptimizationError;
use crate::optimization::generator::TextGenerator;
use crate::optimization::models::{
    CandidateProfile, Evaluation, IterationRecord, JobContext, OptimizationParams,
    OptimizationResult,
};

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Runs the optimization loop on an already-analyzed profile.
///
/// Inputs are validated before any generator call. A generator failure at any
/// pass fails the whole run with `OptimizationFailed`; no partial result is returned.
pub async fn run(
    generator: &dyn TextGenerator,
    original_letter: &str,
    job: &JobContext,
    profile: &CandidateProfile,
    params: OptimizationParams,
    cancel: &CancellationToken,
) -> Result<OptimizationResult, OptimizationError> {
    validate_letter_and_job(original_letter, job)?;
    if profile.is_empty() {
        return Err(OptimizationError::InvalidInput(
            "candidate profile has no extractable facts".to_string(),
        ));
    }
    params.validate().map_err(OptimizationError::InvalidInput)?;

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        target_score = params.target_score,
        max_iterations = params.max_iterations,
        "Starting cover letter optimization for '{}'",
        job.title
    );

    let mut current_letter = original_letter.to_string();
    let mut history: Vec<IterationRecord> = Vec::new();
    let mut iteration: u32 = 0;

    loop {
        // Checked between passes only, so a record is never half-written.
        if cancel.is_cancelled() {
            warn!(%run_id, completed = iteration, "Optimization cancelled");
            return Err(OptimizationError::Cancelled {
                completed_iterations: iteration,
            });
        }

        let pass = iteration + 1;

        let candidate = match generator.optimize(&current_letter, job, profile).await {
            Ok(text) => text,
            Err(source) => return Err(loop_failure(run_id, pass, history, source)),
        };

        let Evaluation {
            score,
            feedback,
            suggestions,
            ..
        } = match generator.evaluate(&candidate, job).await {
            Ok(evaluation) => evaluation,
            Err(source) => return Err(loop_failure(run_id, pass, history, source)),
        };

        current_letter = candidate;
        iteration = pass;
        history.push(IterationRecord {
            iteration_number: iteration,
            letter_text: current_letter.clone(),
            score,
            feedback,
            suggestions,
        });

        info!(%run_id, iteration, score, "Optimization pass complete");

        if score >= params.target_score || iteration >= params.max_iterations {
            break;
        }
    }

    let final_score = history.last().map(|r| r.score).unwrap_or_default();

    let consistency_verified = check(&current_letter, profile);
    if !consistency_verified {
        let report = check_detailed(&current_letter, profile);
        warn!(
            %run_id,
            unsupported = report.unsupported_claims.len(),
            "Final letter makes claims not traceable to the profile: {:?}",
            report.unsupported_claims
        );
    }

    info!(
        %run_id,
        iterations_used = iteration,
        final_score,
        reached_target = final_score >= params.target_score,
        consistency_verified,
        "Cover letter optimization finished"
    );

    Ok(OptimizationResult {
        final_text: current_letter,
        final_score,
        iterations_used: iteration,
        consistency_verified,
        history,
    })
}

/// Full pipeline: validate → analyze CV → run the loop.
///
/// Letter, job and CV are validated before the analyzer is consulted, so invalid
/// requests never reach the generation service.
pub async fn optimize_cover_letter(
    generator: &dyn TextGenerator,
    analyzer: &dyn ProfileAnalyzer,
    cover_letter: &str,
    job: &JobContext,
    cv_text: &str,
    params: OptimizationParams,
    cancel: &CancellationToken,
) -> Result<OptimizationResult, OptimizationError> {
    validate_letter_and_job(cover_letter, job)?;
    if cv_text.trim().is_empty() {
        return Err(OptimizationError::InvalidInput(
            "cv_text cannot be empty".to_string(),
        ));
    }
    params.validate().map_err(OptimizationError::InvalidInput)?;

    let profile = analyzer.analyze(cv_text).await?;
    info!(
        backend = analyzer.backend(),
        years = profile.years_of_experience,
        skills = profile.key_skills.len(),
        "CV analyzed"
    );

    run(generator, cover_letter, job, &profile, params, cancel).await
}

/// One standalone evaluation, outside any loop.
pub async fn evaluate_cover_letter(
    generator: &dyn TextGenerator,
    cover_letter: &str,
    job: &JobContext,
) -> Result<Evaluation, OptimizationError> {
    validate_letter_and_job(cover_letter, job)?;
    Ok(generator.evaluate(cover_letter, job).await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn validate_letter_and_job(letter: &str, job: &JobContext) -> Result<(), OptimizationError> {
    if letter.trim().is_empty() {
        return Err(OptimizationError::InvalidInput(
            "cover_letter cannot be empty".to_string(),
        ));
    }
    if job.is_empty() {
        return Err(OptimizationError::InvalidInput(
            "job description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn loop_failure(
    run_id: Uuid,
    iteration: u32,
    partial_history: Vec<IterationRecord>,
    source: GenerationServiceError,
) -> OptimizationError {
    warn!(%run_id, iteration, "Generation call failed mid-loop: {source}");
    OptimizationError::OptimizationFailed {
        iteration,
        partial_history,
        source,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
