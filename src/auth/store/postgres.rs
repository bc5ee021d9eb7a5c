//! Postgres-backed store.
//!
//! All timestamps are bound as parameters rather than taken from `NOW()`, so
//! the injected clock stays the single source of time. Challenge consumption
//! and session renewal are single statements; the database applies them
//! atomically.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

use super::AuthStore;
use crate::auth::models::{ChallengeCode, Session, UserRecord};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[async_trait]
impl AuthStore for PgStore {
    async fn insert_challenge(&self, challenge: &ChallengeCode) -> Result<()> {
        let query = r"
            INSERT INTO challenge_codes (code, flow, auth_type, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
        ";
        sqlx::query(query)
            .bind(&challenge.code)
            .bind(challenge.flow.as_str())
            .bind(&challenge.auth_type)
            .bind(challenge.created_at)
            .bind(challenge.expires_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .context("failed to insert challenge code")?;
        Ok(())
    }

    async fn get_challenge(&self, code: &str) -> Result<Option<ChallengeCode>> {
        let query = "SELECT * FROM challenge_codes WHERE code = $1";
        sqlx::query_as::<_, ChallengeCode>(query)
            .bind(code)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to fetch challenge code")
    }

    async fn consume_challenge(&self, code: &str) -> Result<Option<ChallengeCode>> {
        // Conditional delete: the row comes back only to the caller whose
        // statement actually removed it, which makes consumption single-winner
        // under concurrent verification attempts.
        let query = "DELETE FROM challenge_codes WHERE code = $1 RETURNING *";
        sqlx::query_as::<_, ChallengeCode>(query)
            .bind(code)
            .fetch_optional(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to consume challenge code")
    }

    async fn insert_session(&self, session: &Session) -> Result<()> {
        let query = r"
            INSERT INTO sessions (id, user_id, device, user_agent, created_at, accessed_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        ";
        sqlx::query(query)
            .bind(session.id)
            .bind(session.user)
            .bind(&session.device)
            .bind(&session.user_agent)
            .bind(session.created_at)
            .bind(session.accessed_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .context("failed to insert session")?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Session>> {
        // Expired sessions are filtered here so they are indistinguishable
        // from sessions that never existed.
        let query = "SELECT * FROM sessions WHERE id = $1 AND expires_at > $2";
        sqlx::query_as::<_, Session>(query)
            .bind(id)
            .bind(now)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to fetch session")
    }

    async fn bump_session(
        &self,
        id: Uuid,
        accessed_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        // Concurrent bumps may race; last write wins and that is fine.
        let query = r"
            UPDATE sessions
            SET accessed_at = $2, expires_at = $3
            WHERE id = $1 AND expires_at > $2
            RETURNING *
        ";
        sqlx::query_as::<_, Session>(query)
            .bind(id)
            .bind(accessed_at)
            .bind(expires_at)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to renew session")
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        let query = "DELETE FROM sessions WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete session")?;
        Ok(())
    }

    async fn find_user_by_public_key(&self, public_key: &str) -> Result<Option<UserRecord>> {
        let query =
            "SELECT id, public_key, namespace, profile, permissions FROM users WHERE public_key = $1";
        sqlx::query_as::<_, UserRecord>(query)
            .bind(public_key)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to fetch user by public key")
    }

    async fn touch_last_login(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let query = "UPDATE users SET last_logged_in = $2 WHERE id = $1";
        sqlx::query(query)
            .bind(user_id)
            .bind(now)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update last login")?;
        Ok(())
    }
}
