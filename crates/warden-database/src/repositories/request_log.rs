//! Request log repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::security::{CreateRequestLog, RequestLog};

use crate::store::RequestLogStore;

/// Repository for the append-only request log.
#[derive(Debug, Clone)]
pub struct RequestLogRepository {
    pool: PgPool,
}

impl RequestLogRepository {
    /// Create a new request log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestLogStore for RequestLogRepository {
    async fn append(&self, entry: CreateRequestLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO request_logs (id, user_id, ip_address, method, path, user_agent, status_code, duration_ms, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::now_v7())
        .bind(entry.user_id)
        .bind(&entry.ip_address)
        .bind(&entry.method)
        .bind(&entry.path)
        .bind(&entry.user_agent)
        .bind(entry.status_code)
        .bind(entry.duration_ms)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to append request log", e))?;
        Ok(())
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<RequestLog>> {
        sqlx::query_as::<_, RequestLog>(
            "SELECT * FROM request_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to list request logs", e))
    }
}
