pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::MAX_PDF_BYTES;
use crate::jobs::handlers as jobs;
use crate::optimization::handlers as optimization;
use crate::state::AppState;

/// Room for two PDFs plus the scalar form fields.
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_PDF_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Cover letters
        .route(
            "/api/v1/cover-letters/optimize",
            post(optimization::handle_optimize),
        )
        .route(
            "/api/v1/cover-letters/optimize/upload",
            post(optimization::handle_optimize_upload)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/cover-letters/evaluate",
            post(optimization::handle_evaluate),
        )
        // Profiles
        .route("/api/v1/profiles/analyze", post(optimization::handle_analyze))
        // Jobs
        .route("/api/v1/jobs/matches", post(jobs::handle_job_matches))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .with_state(state)
}
