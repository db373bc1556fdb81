use axum::extract::State;

use crate::auth::{authenticate, LoginRequest, LoginResponse};
use crate::envelope::{ApiResponse, AppJson};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let response = authenticate(state.users.as_ref(), &state.tokens, request).await?;
    Ok(ApiResponse::ok(response).with_message("Login successful"))
}
