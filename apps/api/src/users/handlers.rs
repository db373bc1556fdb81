use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::envelope::{ApiResponse, AppJson, AppPath};
use crate::errors::AppError;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::users::service::{
    delete_user, get_user, list_users, register, update_user, RegisterRequest, UpdateUserRequest,
};

/// POST /api/users
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, ApiResponse<UserResponse>), AppError> {
    let user = register(state.users.as_ref(), state.bcrypt_cost, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(user).with_message("User created successfully"),
    ))
}

/// GET /api/users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, AppError> {
    Ok(ApiResponse::ok(list_users(state.users.as_ref()).await?))
}

/// GET /api/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    Ok(ApiResponse::ok(get_user(state.users.as_ref(), id).await?))
}

/// PUT /api/users/:id and PATCH /api/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = update_user(state.users.as_ref(), state.bcrypt_cost, id, request).await?;
    Ok(ApiResponse::ok(user).with_message("User updated successfully"))
}

/// DELETE /api/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    auth.ensure_self(id)?;
    delete_user(state.users.as_ref(), id).await?;
    Ok(ApiResponse::message("User deleted"))
}
