pub mod handlers;
pub mod password;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::verify_password;
use crate::auth::token::TokenKeys;
use crate::errors::AppError;
use crate::models::user::UserResponse;
use crate::repositories::UserRepository;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Verifies credentials and issues a session token.
/// An unknown email and a wrong password fail identically.
pub async fn authenticate(
    users: &dyn UserRepository,
    tokens: &TokenKeys,
    request: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let user = users
        .find_by_email(&request.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = tokens.issue(user.id, &user.email)?;
    info!("User {} signed in", user.id);

    Ok(LoginResponse {
        user: user.into(),
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::user::User;
    use crate::repositories::memory::MemoryStore;

    async fn store_with_user(email: &str, password: &str) -> MemoryStore {
        let store = MemoryStore::new();
        let hash = hash_password(password.to_string(), 4).await.unwrap();
        UserRepository::insert(&store, &User::new("Ada Lovelace", email, hash))
            .await
            .unwrap();
        store
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_issues_token_for_user() {
        let store = store_with_user("ada@example.com", "Engine#42").await;
        let keys = TokenKeys::new("k", 24);

        let response = authenticate(&store, &keys, login(" ADA@example.com", "Engine#42"))
            .await
            .unwrap();

        let claims = keys.verify(&response.token).unwrap();
        assert_eq!(claims.user_id, response.user.id);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let store = store_with_user("ada@example.com", "Engine#42").await;
        let keys = TokenKeys::new("k", 24);

        let unknown = authenticate(&store, &keys, login("bob@example.com", "Engine#42"))
            .await
            .unwrap_err();
        let wrong = authenticate(&store, &keys, login("ada@example.com", "engine#42"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }
}
