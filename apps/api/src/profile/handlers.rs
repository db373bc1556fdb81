use axum::extract::{Multipart, State};
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::envelope::{ApiResponse, AppJson, AppMultipart, AppPath};
use crate::errors::AppError;
use crate::models::user::UserResponse;
use crate::profile::images::ImageUpload;
use crate::profile::operations::{
    NewActivity, NewExperience, NewPortfolioItem, ProfileManager, ProfileUpdate,
};
use crate::state::AppState;

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "profileImage";

fn manager(state: &AppState) -> ProfileManager<'_> {
    ProfileManager::new(state.users.as_ref(), state.images.as_ref())
}

/// PUT /api/profile/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<ProfileUpdate>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).update_profile(id, update).await?;
    Ok(ApiResponse::ok(user).with_message("Profile updated successfully"))
}

/// POST /api/profile/:id/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<NewExperience>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).add_experience(id, input).await?;
    Ok(ApiResponse::ok(user).with_message("Experience added successfully"))
}

/// DELETE /api/profile/:id/experience/:item_id
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((id, item_id)): AppPath<(Uuid, Uuid)>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).remove_experience(id, item_id).await?;
    Ok(ApiResponse::ok(user).with_message("Experience removed successfully"))
}

/// POST /api/profile/:id/portfolio
pub async fn handle_add_portfolio_item(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<NewPortfolioItem>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).add_portfolio_item(id, input).await?;
    Ok(ApiResponse::ok(user).with_message("Portfolio item added successfully"))
}

/// DELETE /api/profile/:id/portfolio/:item_id
pub async fn handle_remove_portfolio_item(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((id, item_id)): AppPath<(Uuid, Uuid)>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).remove_portfolio_item(id, item_id).await?;
    Ok(ApiResponse::ok(user).with_message("Portfolio item removed successfully"))
}

/// POST /api/profile/:id/recent-activity
pub async fn handle_add_recent_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<NewActivity>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).add_recent_activity(id, input).await?;
    Ok(ApiResponse::ok(user).with_message("Activity added successfully"))
}

/// DELETE /api/profile/:id/recent-activity/:item_id
pub async fn handle_remove_recent_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((id, item_id)): AppPath<(Uuid, Uuid)>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).remove_recent_activity(id, item_id).await?;
    Ok(ApiResponse::ok(user).with_message("Activity removed successfully"))
}

/// POST /api/profile/:id/upload-image
///
/// Multipart form with the image in the `profileImage` field.
pub async fn handle_upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppMultipart(multipart): AppMultipart,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let upload = read_image_field(multipart).await?;
    let user = manager(&state).upload_image(id, upload).await?;
    Ok(ApiResponse::ok(user).with_message("Profile image uploaded successfully"))
}

/// DELETE /api/profile/:id/delete-image
pub async fn handle_delete_image(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    auth.ensure_self(id)?;
    let user = manager(&state).delete_image(id).await?;
    Ok(ApiResponse::ok(user).with_message("Profile image deleted successfully"))
}

async fn read_image_field(mut multipart: Multipart) -> Result<Option<ImageUpload>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok(Some(ImageUpload {
            file_name,
            content_type,
            data,
        }));
    }
    Ok(None)
}
