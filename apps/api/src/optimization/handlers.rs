//! Axum route handlers for the Cover Letter and Profile APIs.

use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::documents::{extract_pdf_text, validate_pdf_upload};
use crate::errors::AppError;
use crate::jobs::repository::fetch_job;
use crate::optimization::models::{
    CandidateProfile, Evaluation, JobContext, OptimizationParams, OptimizationResult,
};
use crate::optimization::optimizer::{evaluate_cover_letter, optimize_cover_letter};
use crate::state::AppState;

/// Upper bound on a per-request iteration budget.
pub const MAX_ITERATIONS_CAP: u32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub cover_letter: String,
    pub cv_text: String,
    /// Inline job; mutually exclusive with `job_id`.
    pub job: Option<JobContext>,
    pub job_id: Option<Uuid>,
    pub target_score: Option<f64>,
    pub max_iterations: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub cover_letter: String,
    pub job: Option<JobContext>,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub cv_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub profile: CandidateProfile,
    pub backend: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cover-letters/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    let params = resolve_params(&state, req.target_score, req.max_iterations)?;
    let job = resolve_job(&state, req.job, req.job_id).await?;
    let result = run_with_budget(&state, &req.cover_letter, &job, &req.cv_text, params).await?;
    Ok(Json(result))
}

/// POST /api/v1/cover-letters/optimize/upload
///
/// Multipart fields: `cover_letter`, `cv` (PDF file or plain text), `job_id`,
/// and optional `target_score` / `max_iterations`.
pub async fn handle_optimize_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OptimizationResult>, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        let content_type = field.content_type().map(str::to_string);

        let value = if is_file {
            let data: Bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("could not read {name}: {e}")))?;
            FieldValue::File { content_type, data }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("could not read {name}: {e}")))?;
            FieldValue::Text(text)
        };
        form.set(&name, value)?;
    }

    let cover_letter = document_text("cover_letter", form.cover_letter).await?;
    let cv_text = document_text("cv", form.cv).await?;
    let job_id = form
        .job_id
        .ok_or_else(|| AppError::Validation("job_id is required".to_string()))?;

    let params = resolve_params(&state, form.target_score, form.max_iterations)?;
    let job = resolve_job(&state, None, Some(job_id)).await?;
    let result = run_with_budget(&state, &cover_letter, &job, &cv_text, params).await?;
    Ok(Json(result))
}

/// POST /api/v1/cover-letters/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<Evaluation>, AppError> {
    let job = resolve_job(&state, req.job, req.job_id).await?;
    let evaluation = evaluate_cover_letter(state.generator.as_ref(), &req.cover_letter, &job).await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/profiles/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let profile = state.analyzer.analyze(&req.cv_text).await?;
    Ok(Json(AnalyzeResponse {
        profile,
        backend: state.analyzer.backend(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full pipeline under the configured wall-clock budget. The run gets
/// a child of the shutdown token so server shutdown stops it between passes.
async fn run_with_budget(
    state: &AppState,
    cover_letter: &str,
    job: &JobContext,
    cv_text: &str,
    params: OptimizationParams,
) -> Result<OptimizationResult, AppError> {
    let cancel = state.shutdown.child_token();
    let budget = state.config.optimization_timeout_secs;

    let run = optimize_cover_letter(
        state.generator.as_ref(),
        state.analyzer.as_ref(),
        cover_letter,
        job,
        cv_text,
        params,
        &cancel,
    );

    match tokio::time::timeout(Duration::from_secs(budget), run).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            cancel.cancel();
            Err(AppError::Timeout(budget))
        }
    }
}

/// Request overrides on top of the configured defaults.
fn resolve_params(
    state: &AppState,
    target_score: Option<f64>,
    max_iterations: Option<u32>,
) -> Result<OptimizationParams, AppError> {
    let defaults = state.config.default_params();
    let max_iterations = max_iterations.unwrap_or(defaults.max_iterations);
    if max_iterations > MAX_ITERATIONS_CAP {
        return Err(AppError::Validation(format!(
            "max_iterations must be at most {MAX_ITERATIONS_CAP}"
        )));
    }
    Ok(OptimizationParams {
        target_score: target_score.unwrap_or(defaults.target_score),
        max_iterations,
    })
}

/// Exactly one of an inline job or a stored job id must be given.
async fn resolve_job(
    state: &AppState,
    inline: Option<JobContext>,
    job_id: Option<Uuid>,
) -> Result<JobContext, AppError> {
    match (inline, job_id) {
        (Some(job), None) => Ok(job),
        (None, Some(id)) => {
            let row = fetch_job(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
            info!(job_id = %id, company = %row.company, "Loaded job listing");
            Ok(row.to_context())
        }
        (Some(_), Some(_)) => Err(AppError::Validation(
            "provide either job or job_id, not both".to_string(),
        )),
        (None, None) => Err(AppError::Validation(
            "either job or job_id is required".to_string(),
        )),
    }
}

enum FieldValue {
    Text(String),
    File {
        content_type: Option<String>,
        data: Bytes,
    },
}

#[derive(Default)]
struct UploadForm {
    cover_letter: Option<FieldValue>,
    cv: Option<FieldValue>,
    job_id: Option<Uuid>,
    target_score: Option<f64>,
    max_iterations: Option<u32>,
}

impl UploadForm {
    fn set(&mut self, name: &str, value: FieldValue) -> Result<(), AppError> {
        match name {
            "cover_letter" => self.cover_letter = Some(value),
            "cv" | "cv_text" => self.cv = Some(value),
            "job_id" => self.job_id = Some(parse_text_field(name, value)?),
            "target_score" => self.target_score = Some(parse_text_field(name, value)?),
            "max_iterations" => self.max_iterations = Some(parse_text_field(name, value)?),
            // Unknown fields are ignored.
            _ => {}
        }
        Ok(())
    }
}

fn parse_text_field<T: std::str::FromStr>(name: &str, value: FieldValue) -> Result<T, AppError> {
    let FieldValue::Text(raw) = value else {
        return Err(AppError::Validation(format!("{name} must be a text field")));
    };
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} has an invalid value: {raw:?}")))
}

async fn document_text(name: &str, value: Option<FieldValue>) -> Result<String, AppError> {
    match value {
        Some(FieldValue::Text(text)) => Ok(text),
        Some(FieldValue::File { content_type, data }) => {
            validate_pdf_upload(name, content_type.as_deref(), data.len())?;
            extract_pdf_text(name, data).await
        }
        None => Err(AppError::Validation(format!("{name} is required"))),
    }
}
