use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_core::types::{PageRequest, PageResponse};
use warden_entity::security::{
    CreateRequestLog, FailedLoginAttempt, FailedLoginRecord, RequestLog,
};

use super::MemoryStore;
use crate::store::{FailedLoginStore, RequestLogStore};

#[async_trait]
impl FailedLoginStore for MemoryStore {
    async fn record_failure(
        &self,
        attempt: &FailedLoginAttempt,
        now: DateTime<Utc>,
    ) -> AppResult<FailedLoginRecord> {
        let mut state = self.state.lock().await;
        let record = state
            .failed_logins
            .entry(attempt.ip_address.clone())
            .and_modify(|r| {
                r.attempts += 1;
                r.username = attempt.username.clone();
                r.user_agent = attempt.user_agent.clone();
                r.last_attempt_at = now;
            })
            .or_insert_with(|| FailedLoginRecord {
                id: Uuid::now_v7(),
                ip_address: attempt.ip_address.clone(),
                username: attempt.username.clone(),
                user_agent: attempt.user_agent.clone(),
                attempts: 1,
                last_attempt_at: now,
                created_at: now,
            });
        Ok(record.clone())
    }

    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<FailedLoginRecord>> {
        let state = self.state.lock().await;
        let mut records: Vec<FailedLoginRecord> = state.failed_logins.values().cloned().collect();
        records.sort_by(|a, b| b.last_attempt_at.cmp(&a.last_attempt_at));
        let total = records.len() as u64;
        let items = records
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }
}

#[async_trait]
impl RequestLogStore for MemoryStore {
    async fn append(&self, entry: CreateRequestLog) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.request_logs.push(RequestLog {
            id: Uuid::now_v7(),
            user_id: entry.user_id,
            ip_address: entry.ip_address,
            method: entry.method,
            path: entry.path,
            user_agent: entry.user_agent,
            status_code: entry.status_code,
            duration_ms: entry.duration_ms,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<RequestLog>> {
        let state = self.state.lock().await;
        Ok(state
            .request_logs
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
