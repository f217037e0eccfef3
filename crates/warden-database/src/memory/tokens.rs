use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::token::{CreateRefreshToken, RefreshToken};

use super::MemoryStore;
use crate::store::RefreshTokenStore;

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create(&self, data: CreateRefreshToken) -> AppResult<RefreshToken> {
        let mut state = self.state.lock().await;
        if state.refresh_tokens.contains_key(&data.token_hash) {
            return Err(AppError::database("refresh token digest collision"));
        }
        let token = RefreshToken {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            token_hash: data.token_hash,
            expires_at: data.expires_at,
            is_active: true,
            created_at: Utc::now(),
        };
        state
            .refresh_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>> {
        let state = self.state.lock().await;
        Ok(state
            .refresh_tokens
            .get(token_hash)
            .filter(|t| t.is_usable(now))
            .cloned())
    }

    async fn deactivate(&self, token_hash: &str) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        match state.refresh_tokens.get_mut(token_hash) {
            Some(token) if token.is_active => {
                token.is_active = false;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn deactivate_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for token in state
            .refresh_tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && t.is_active)
        {
            token.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn count_active_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .refresh_tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_usable(now))
            .count() as u64)
    }

    async fn purge(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| !t.is_purgeable(now));
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}
