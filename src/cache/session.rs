//! Per-user session state: the selected tenant and an onboarding snapshot.
//!
//! The web client used to keep this in browser storage; here it lives behind
//! the key-value seam so every API instance sees the same selection. One
//! tenant is selected at a time: writing a new state replaces the previous
//! one wholesale.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CacheError, KeyValueStore};
use crate::config;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub user_id: Uuid,
    pub email: String,
    pub tenant_id: Option<Uuid>,
    pub tenant_slug: Option<String>,
    pub role: Option<String>,
    pub onboarding_step: Option<String>,
    pub selected_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Session right after login, before any tenant selection
    pub fn signed_in(user_id: Uuid, email: String) -> Self {
        Self {
            user_id,
            email,
            tenant_id: None,
            tenant_slug: None,
            role: None,
            onboarding_step: None,
            selected_at: None,
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(user_id: Uuid) -> String {
        format!("session:{}", user_id)
    }

    pub async fn write(&self, state: &SessionState) -> Result<(), CacheError> {
        let ttl = Duration::from_secs(config::config().cache.session_ttl_secs);
        let payload = serde_json::to_string(state)?;
        self.store
            .set(&Self::key(state.user_id), &payload, Some(ttl))
            .await
    }

    pub async fn read(&self, user_id: Uuid) -> Result<Option<SessionState>, CacheError> {
        match self.store.get(&Self::key(user_id)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<bool, CacheError> {
        self.store.delete(&Self::key(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    #[tokio::test]
    async fn session_round_trip() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let state = SessionState::signed_in(Uuid::new_v4(), "a@b.vn".into());

        sessions.write(&state).await.unwrap();
        let read = sessions.read(state.user_id).await.unwrap().unwrap();
        assert_eq!(read, state);

        assert!(sessions.clear(state.user_id).await.unwrap());
        assert!(sessions.read(state.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn selecting_a_tenant_replaces_the_previous_selection() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let user_id = Uuid::new_v4();

        let first = SessionState {
            tenant_id: Some(Uuid::new_v4()),
            tenant_slug: Some("cong-ty-a".into()),
            role: Some("owner".into()),
            selected_at: Some(Utc::now()),
            ..SessionState::signed_in(user_id, "a@b.vn".into())
        };
        sessions.write(&first).await.unwrap();

        let second = SessionState {
            tenant_id: Some(Uuid::new_v4()),
            tenant_slug: Some("cong-ty-b".into()),
            role: Some("member".into()),
            selected_at: Some(Utc::now()),
            ..SessionState::signed_in(user_id, "a@b.vn".into())
        };
        sessions.write(&second).await.unwrap();

        let read = sessions.read(user_id).await.unwrap().unwrap();
        assert_eq!(read.tenant_slug.as_deref(), Some("cong-ty-b"));
        assert_ne!(read.tenant_id, first.tenant_id);
    }
}
