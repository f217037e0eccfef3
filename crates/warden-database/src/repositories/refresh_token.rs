//! Refresh token repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::token::{CreateRefreshToken, RefreshToken};

use crate::store::RefreshTokenStore;

/// Repository for persisted refresh tokens.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn create(&self, data: CreateRefreshToken) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, is_active, created_at) \
             VALUES ($1, $2, $3, $4, TRUE, $5) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.user_id)
        .bind(&data.token_hash)
        .bind(data.expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to persist refresh token", e))
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1 AND is_active AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to look up refresh token", e))
    }

    async fn deactivate(&self, token_hash: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_active = FALSE WHERE token_hash = $1 AND is_active",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to revoke refresh token", e))?;
        Ok(result.rows_affected())
    }

    async fn deactivate_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_active = FALSE WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to revoke user refresh tokens", e))?;
        Ok(result.rows_affected())
    }

    async fn count_active_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1 AND is_active AND expires_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to count refresh tokens", e))?;
        Ok(count as u64)
    }

    async fn purge(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE NOT is_active OR expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::storage("Failed to purge refresh tokens", e))?;
        Ok(result.rows_affected())
    }
}
