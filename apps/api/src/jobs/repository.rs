use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::JobRow;

/// Returns the listing with `id`, active or not.
pub async fn fetch_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All active listings, newest first.
pub async fn list_active_jobs(pool: &PgPool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE is_active = TRUE ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}
