use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{normalize_email, User, UserRow};
use crate::repositories::{PgStore, UserRepository, DUPLICATE_EMAIL};

#[async_trait]
impl UserRepository for PgStore {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, full_name, password_hash, profile_image, bio, skills,
                 experience, portfolio, recent_activity, rating, completed_jobs,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.profile_image)
        .bind(&user.bio)
        .bind(&user.skills)
        .bind(Json(&user.experience))
        .bind(Json(&user.portfolio))
        .bind(Json(&user.recent_activity))
        .bind(user.rating)
        .bind(user.completed_jobs)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_EMAIL))?;
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, full_name = $3, password_hash = $4, profile_image = $5,
                bio = $6, skills = $7, experience = $8, portfolio = $9,
                recent_activity = $10, rating = $11, completed_jobs = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.profile_image)
        .bind(&user.bio)
        .bind(&user.skills)
        .bind(Json(&user.experience))
        .bind(Json(&user.portfolio))
        .bind(Json(&user.recent_activity))
        .bind(user.rating)
        .bind(user.completed_jobs)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_EMAIL))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
