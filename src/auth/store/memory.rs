//! In-memory store for tests and local development.
//!
//! A single mutex over the whole state gives the same atomicity the database
//! provides: `consume_challenge` is a `HashMap::remove`, so at most one
//! concurrent verifier wins.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::AuthStore;
use crate::auth::models::{ChallengeCode, Session, UserRecord};

#[derive(Default)]
struct Inner {
    challenges: HashMap<String, ChallengeCode>,
    sessions: HashMap<Uuid, Session>,
    users: HashMap<String, UserRecord>,
    last_logins: HashMap<Uuid, DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an identity; users are otherwise owned by an external
    /// collaborator.
    pub async fn insert_user(&self, user: UserRecord) {
        let mut inner = self.inner.lock().await;
        inner.users.insert(user.public_key.clone(), user);
    }

    pub async fn last_login(&self, user_id: Uuid) -> Option<DateTime<Utc>> {
        self.inner.lock().await.last_logins.get(&user_id).copied()
    }

    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn insert_challenge(&self, challenge: &ChallengeCode) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .challenges
            .insert(challenge.code.clone(), challenge.clone());
        Ok(())
    }

    async fn get_challenge(&self, code: &str) -> Result<Option<ChallengeCode>> {
        Ok(self.inner.lock().await.challenges.get(code).cloned())
    }

    async fn consume_challenge(&self, code: &str) -> Result<Option<ChallengeCode>> {
        Ok(self.inner.lock().await.challenges.remove(code))
    }

    async fn insert_session(&self, session: &Session) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Session>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .get(&id)
            .filter(|session| session.expires_at > now)
            .cloned())
    }

    async fn bump_session(
        &self,
        id: Uuid,
        accessed_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.sessions.get_mut(&id) else {
            return Ok(None);
        };
        if session.expires_at <= accessed_at {
            return Ok(None);
        }
        session.accessed_at = accessed_at;
        session.expires_at = expires_at;
        Ok(Some(session.clone()))
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        self.inner.lock().await.sessions.remove(&id);
        Ok(())
    }

    async fn find_user_by_public_key(&self, public_key: &str) -> Result<Option<UserRecord>> {
        Ok(self.inner.lock().await.users.get(public_key).cloned())
    }

    async fn touch_last_login(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        self.inner.lock().await.last_logins.insert(user_id, now);
        Ok(())
    }
}
