use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::envelope::{ApiResponse, AppJson, AppPath, AppQuery};
use crate::errors::AppError;
use crate::jobs::lifecycle::{JobLifecycle, NewJob};
use crate::models::job::{Job, JobPatch, JobStatus};
use crate::state::AppState;
use crate::users::service::load_user;

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<JobListQuery>,
) -> Result<ApiResponse<Vec<Job>>, AppError> {
    let jobs = JobLifecycle::new(state.jobs.as_ref()).list(query.status).await?;
    Ok(ApiResponse::ok(jobs))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Job>, AppError> {
    Ok(ApiResponse::ok(JobLifecycle::new(state.jobs.as_ref()).get(id).await?))
}

/// GET /api/jobs/category/:category
pub async fn handle_jobs_by_category(
    State(state): State<AppState>,
    AppPath(category): AppPath<String>,
) -> Result<ApiResponse<Vec<Job>>, AppError> {
    let jobs = JobLifecycle::new(state.jobs.as_ref())
        .list_by_category(&category)
        .await?;
    Ok(ApiResponse::ok(jobs))
}

/// GET /api/my-jobs
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<Job>>, AppError> {
    let jobs = JobLifecycle::new(state.jobs.as_ref())
        .list_by_client(auth.user_id)
        .await?;
    Ok(ApiResponse::ok(jobs))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<NewJob>,
) -> Result<(StatusCode, ApiResponse<Job>), AppError> {
    let owner = load_user(state.users.as_ref(), auth.user_id).await?;
    let job = JobLifecycle::new(state.jobs.as_ref())
        .create(owner.id, &owner.full_name, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(job).with_message("Job created successfully"),
    ))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<JobPatch>,
) -> Result<ApiResponse<Job>, AppError> {
    let job = JobLifecycle::new(state.jobs.as_ref())
        .update(id, patch, auth.user_id)
        .await?;
    Ok(ApiResponse::ok(job).with_message("Job updated successfully"))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    JobLifecycle::new(state.jobs.as_ref())
        .delete(id, auth.user_id)
        .await?;
    Ok(ApiResponse::message("Job deleted successfully"))
}
