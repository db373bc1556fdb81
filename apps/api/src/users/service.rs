use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::errors::AppError;
use crate::models::user::{normalize_email, User, UserResponse};
use crate::repositories::{UserRepository, DUPLICATE_EMAIL};
use crate::users::validation::{check_email, check_full_name, check_password, finish};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Partial account update shared by PUT and PATCH.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Loads a user or fails with `NotFound`.
pub async fn load_user(users: &dyn UserRepository, id: Uuid) -> Result<User, AppError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn register(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<UserResponse, AppError> {
    let mut errors = Vec::new();
    check_full_name(&request.full_name, &mut errors);
    check_email(&request.email, &mut errors);
    check_password(&request.password, &mut errors);
    finish(errors)?;

    if users.find_by_email(&request.email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
    }

    let password_hash = hash_password(request.password, bcrypt_cost).await?;
    let user = User::new(&request.full_name, &request.email, password_hash);
    users.insert(&user).await?;

    info!("Registered user {}", user.id);
    Ok(user.into())
}

pub async fn get_user(users: &dyn UserRepository, id: Uuid) -> Result<UserResponse, AppError> {
    Ok(load_user(users, id).await?.into())
}

pub async fn list_users(users: &dyn UserRepository) -> Result<Vec<UserResponse>, AppError> {
    Ok(users
        .find_all()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect())
}

pub async fn update_user(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    id: Uuid,
    request: UpdateUserRequest,
) -> Result<UserResponse, AppError> {
    let mut errors = Vec::new();
    if let Some(full_name) = &request.full_name {
        check_full_name(full_name, &mut errors);
    }
    if let Some(email) = &request.email {
        check_email(email, &mut errors);
    }
    if let Some(password) = &request.password {
        check_password(password, &mut errors);
    }
    finish(errors)?;

    let mut user = load_user(users, id).await?;

    if let Some(full_name) = request.full_name {
        user.full_name = full_name.trim().to_string();
    }
    if let Some(email) = request.email {
        let email = normalize_email(&email);
        if email != user.email && users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        user.email = email;
    }
    if let Some(password) = request.password {
        user.password_hash = hash_password(password, bcrypt_cost).await?;
    }
    if let Some(bio) = request.bio {
        user.bio = bio;
    }
    if let Some(skills) = request.skills {
        user.skills = skills;
    }
    user.updated_at = Utc::now();

    users.save(&user).await?;
    info!("Updated user {id}");
    Ok(user.into())
}

pub async fn delete_user(users: &dyn UserRepository, id: Uuid) -> Result<(), AppError> {
    if !users.delete(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("Deleted user {id}");
    Ok(())
}
