//! bcrypt hashing, run on the blocking pool so request workers stay free.

use anyhow::Context;
use tracing::warn;

use crate::errors::AppError;

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")?;
    Ok(hashed)
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verdict = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?;
    match verdict {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!("Stored password hash could not be verified: {e}");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("Secret#1".to_string(), 4).await.unwrap();
        assert_ne!(hash, "Secret#1");
        assert!(verify_password("Secret#1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("secret#1".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_a_mismatch() {
        let ok = verify_password("Secret#1".to_string(), "not-a-hash".to_string())
            .await
            .unwrap();
        assert!(!ok);
    }
}
