//! Session lifecycle with sliding expiration.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use super::clock::Clock;
use super::error::AuthError;
use super::models::Session;
use super::store::AuthStore;

pub struct SessionService {
    store: Arc<dyn AuthStore>,
    clock: Arc<dyn Clock>,
    ttl_seconds: i64,
}

impl SessionService {
    #[must_use]
    pub fn new(store: Arc<dyn AuthStore>, clock: Arc<dyn Clock>, ttl_seconds: i64) -> Self {
        Self {
            store,
            clock,
            ttl_seconds,
        }
    }

    /// Open a session for `user`.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingUserAgent`] when the user agent is empty; store
    /// errors otherwise.
    pub async fn create(
        &self,
        user: Uuid,
        device: &str,
        user_agent: &str,
    ) -> Result<Session, AuthError> {
        if user_agent.trim().is_empty() {
            return Err(AuthError::MissingUserAgent);
        }

        let now = self.clock.now();
        let session = Session {
            id: Uuid::new_v4(),
            user,
            device: device.to_string(),
            user_agent: user_agent.to_string(),
            created_at: now,
            accessed_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds),
        };

        self.store.insert_session(&session).await?;

        Ok(session)
    }

    /// Fetch a live session. Expired sessions are reported as absent.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn get(&self, id: Uuid) -> Result<Option<Session>, AuthError> {
        Ok(self.store.get_session(id, self.clock.now()).await?)
    }

    /// Fetch a live session and renew it: `accessed_at` moves to now and the
    /// expiry window restarts. Concurrent bumps race harmlessly.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn get_and_bump(&self, id: Uuid) -> Result<Option<Session>, AuthError> {
        let now = self.clock.now();
        let expires_at = now + Duration::seconds(self.ttl_seconds);
        Ok(self.store.bump_session(id, now, expires_at).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::test_support::ManualClock;
    use crate::auth::store::MemoryStore;
    use chrono::Utc;

    const TTL_SECONDS: i64 = 21 * 24 * 60 * 60;

    fn fixture() -> (SessionService, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = SessionService::new(store, clock.clone(), TTL_SECONDS);
        (service, clock)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() -> anyhow::Result<()> {
        let (service, _clock) = fixture();
        let user = Uuid::new_v4();

        let created = service.create(user, "desktop", "test-agent").await?;
        let fetched = service
            .get(created.id)
            .await?
            .expect("session should be readable");

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.user, user);
        assert_eq!(
            fetched.expires_at - fetched.accessed_at,
            Duration::seconds(TTL_SECONDS)
        );
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_user_agent() {
        let (service, _clock) = fixture();
        let result = service.create(Uuid::new_v4(), "desktop", "  ").await;
        assert!(matches!(result, Err(AuthError::MissingUserAgent)));
    }

    #[tokio::test]
    async fn bump_slides_the_expiry_window() -> anyhow::Result<()> {
        let (service, clock) = fixture();
        let created = service
            .create(Uuid::new_v4(), "desktop", "test-agent")
            .await?;

        clock.advance(Duration::hours(6));
        let bumped = service
            .get_and_bump(created.id)
            .await?
            .expect("session should be live");

        assert!(bumped.expires_at > created.expires_at);
        assert_eq!(bumped.accessed_at, clock.now());
        assert_eq!(
            bumped.expires_at - bumped.accessed_at,
            Duration::seconds(TTL_SECONDS)
        );

        // A second bump later keeps sliding forward.
        clock.advance(Duration::hours(1));
        let again = service
            .get_and_bump(created.id)
            .await?
            .expect("session should still be live");
        assert!(again.expires_at > bumped.expires_at);
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_is_gone_for_good() -> anyhow::Result<()> {
        let (service, clock) = fixture();
        let created = service
            .create(Uuid::new_v4(), "desktop", "test-agent")
            .await?;

        clock.set(created.expires_at);
        assert!(service.get(created.id).await?.is_none());
        // A bump cannot resurrect it either.
        assert!(service.get_and_bump(created.id).await?.is_none());
        assert!(service.get(created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn missing_and_expired_are_indistinguishable() -> anyhow::Result<()> {
        let (service, clock) = fixture();
        let created = service
            .create(Uuid::new_v4(), "desktop", "test-agent")
            .await?;
        clock.set(created.expires_at + Duration::seconds(1));

        let expired = service.get(created.id).await?;
        let missing = service.get(Uuid::new_v4()).await?;
        assert!(expired.is_none());
        assert!(missing.is_none());
        Ok(())
    }
}
