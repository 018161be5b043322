//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::matching::{rank_jobs, JobMatch, MatchCandidate};
use crate::jobs::repository::{fetch_job, list_active_jobs};
use crate::models::job::JobRow;
use crate::state::AppState;

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = fetch_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs/matches
pub async fn handle_job_matches(
    State(state): State<AppState>,
    Json(candidate): Json<MatchCandidate>,
) -> Result<Json<Vec<JobMatch>>, AppError> {
    let jobs = list_active_jobs(&state.db).await?;
    let total = jobs.len();
    let matches = rank_jobs(&candidate, jobs);
    tracing::info!(total, returned = matches.len(), "Ranked job matches");
    Ok(Json(matches))
}
