use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::envelope::{ApiResponse, AppJson, AppPath};
use crate::errors::AppError;
use crate::models::proposal::{Proposal, ProposalPatch};
use crate::proposals::lifecycle::{NewProposal, ProposalLifecycle};
use crate::state::AppState;
use crate::users::service::load_user;

fn lifecycle(state: &AppState) -> ProposalLifecycle<'_> {
    ProposalLifecycle::new(state.jobs.as_ref(), state.proposals.as_ref())
}

/// POST /api/proposals
pub async fn handle_submit_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<NewProposal>,
) -> Result<(StatusCode, ApiResponse<Proposal>), AppError> {
    let freelancer = load_user(state.users.as_ref(), auth.user_id).await?;
    let proposal = lifecycle(&state)
        .submit(freelancer.id, &freelancer.full_name, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(proposal).with_message("Proposal submitted successfully"),
    ))
}

/// GET /api/proposals/:id
pub async fn handle_get_proposal(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Proposal>, AppError> {
    Ok(ApiResponse::ok(lifecycle(&state).get(id).await?))
}

/// GET /api/proposals/job/:job_id
pub async fn handle_job_proposals(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<ApiResponse<Vec<Proposal>>, AppError> {
    Ok(ApiResponse::ok(lifecycle(&state).list_by_job(job_id).await?))
}

/// GET /api/my-proposals
pub async fn handle_my_proposals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<Proposal>>, AppError> {
    let proposals = lifecycle(&state).list_by_freelancer(auth.user_id).await?;
    Ok(ApiResponse::ok(proposals))
}

/// PUT /api/proposals/:id
pub async fn handle_update_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<ProposalPatch>,
) -> Result<ApiResponse<Proposal>, AppError> {
    let proposal = lifecycle(&state).update(id, patch, auth.user_id).await?;
    Ok(ApiResponse::ok(proposal).with_message("Proposal updated successfully"))
}

/// POST /api/proposals/:id/accept
pub async fn handle_accept_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Proposal>, AppError> {
    let proposal = lifecycle(&state).accept(id, auth.user_id).await?;
    Ok(ApiResponse::ok(proposal).with_message("Proposal accepted successfully"))
}

/// DELETE /api/proposals/:id
pub async fn handle_withdraw_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    lifecycle(&state).withdraw(id, auth.user_id).await?;
    Ok(ApiResponse::message("Proposal withdrawn successfully"))
}
