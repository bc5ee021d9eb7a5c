//! Durable state behind the authentication core.
//!
//! The store is the sole synchronization point between concurrent requests:
//! challenge consumption and session renewal are conditional operations that
//! the backing store must apply atomically. Services hold an
//! `Arc<dyn AuthStore>` so Postgres can be swapped for the in-memory
//! implementation in tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{ChallengeCode, Session, UserRecord};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn insert_challenge(&self, challenge: &ChallengeCode) -> Result<()>;

    async fn get_challenge(&self, code: &str) -> Result<Option<ChallengeCode>>;

    /// Delete the challenge and return it. At most one caller observes
    /// `Some`; everyone else gets `None`. This is the single-winner primitive
    /// challenge consumption relies on.
    async fn consume_challenge(&self, code: &str) -> Result<Option<ChallengeCode>>;

    async fn insert_session(&self, session: &Session) -> Result<()>;

    /// Fetch a session if it exists and has not expired as of `now`.
    async fn get_session(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Session>>;

    /// Renew a live session in place. Returns the renewed session, or `None`
    /// when the session is missing or already expired at `accessed_at`.
    async fn bump_session(
        &self,
        id: Uuid,
        accessed_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Session>>;

    /// Idempotent delete; removing an absent session is not an error.
    async fn delete_session(&self, id: Uuid) -> Result<()>;

    async fn find_user_by_public_key(&self, public_key: &str) -> Result<Option<UserRecord>>;

    async fn touch_last_login(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<()>;
}
