//! Failed login repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{PageRequest, PageResponse};
use warden_entity::security::{FailedLoginAttempt, FailedLoginRecord};

use crate::store::FailedLoginStore;

/// Repository for per-address failed login counters.
#[derive(Debug, Clone)]
pub struct FailedLoginRepository {
    pool: PgPool,
}

impl FailedLoginRepository {
    /// Create a new failed login repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FailedLoginStore for FailedLoginRepository {
    async fn record_failure(
        &self,
        attempt: &FailedLoginAttempt,
        now: DateTime<Utc>,
    ) -> AppResult<FailedLoginRecord> {
        sqlx::query_as::<_, FailedLoginRecord>(
            "INSERT INTO failed_logins (id, ip_address, username, user_agent, attempts, last_attempt_at, created_at) \
             VALUES ($1, $2, $3, $4, 1, $5, $5) \
             ON CONFLICT (ip_address) DO UPDATE SET \
                 attempts = failed_logins.attempts + 1, \
                 username = EXCLUDED.username, \
                 user_agent = EXCLUDED.user_agent, \
                 last_attempt_at = EXCLUDED.last_attempt_at \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&attempt.ip_address)
        .bind(&attempt.username)
        .bind(&attempt.user_agent)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to record failed login", e))
    }

    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<FailedLoginRecord>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM failed_logins")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to count failed logins", e))?;

        let records = sqlx::query_as::<_, FailedLoginRecord>(
            "SELECT * FROM failed_logins ORDER BY last_attempt_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to list failed logins", e))?;

        Ok(PageResponse::new(records, page, total as u64))
    }
}
