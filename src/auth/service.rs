//! Login completion and bearer authentication.
//!
//! `AuthService` is the only place the challenge, session, and token pieces
//! are used together; it owns the end-to-end contract the HTTP handlers
//! expose.

use std::sync::Arc;

use super::challenge::ChallengeService;
use super::clock::Clock;
use super::config::AuthConfig;
use super::error::AuthError;
use super::models::{ChallengeCode, ChallengeFlow, LoginGrant, Session};
use super::session::SessionService;
use super::store::AuthStore;
use super::token::SessionTokenCodec;

/// The only key-proof method currently issued. The field is persisted per
/// challenge so new methods can coexist without a migration.
pub const AUTH_TYPE_MNEMONIC: &str = "mnemonic";

pub struct AuthService {
    store: Arc<dyn AuthStore>,
    challenges: ChallengeService,
    sessions: SessionService,
    tokens: SessionTokenCodec,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn AuthStore>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        let challenges = ChallengeService::new(
            store.clone(),
            clock.clone(),
            config.challenge_ttl_seconds(),
        );
        let sessions = SessionService::new(
            store.clone(),
            clock.clone(),
            config.session_ttl_seconds(),
        );
        let tokens = SessionTokenCodec::new(config.into_token_secret());
        Self {
            store,
            challenges,
            sessions,
            tokens,
            clock,
        }
    }

    /// Issue a registration challenge. Registration does not require a known
    /// identity up front; the signed response is bound to whatever key the
    /// client registers with.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn start_registration(&self) -> Result<ChallengeCode, AuthError> {
        self.challenges
            .create(ChallengeFlow::Registration, AUTH_TYPE_MNEMONIC)
            .await
    }

    /// Issue a login challenge for the identity owning `public_key`.
    ///
    /// # Errors
    ///
    /// [`AuthError::UserNotFound`] when no identity claims the key.
    pub async fn start_login(&self, public_key: &str) -> Result<ChallengeCode, AuthError> {
        self.store
            .find_user_by_public_key(public_key)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.challenges
            .create(ChallengeFlow::Login, AUTH_TYPE_MNEMONIC)
            .await
    }

    /// Complete a login: verify and consume the challenge, resolve the
    /// identity, stamp its last login, open a session, and issue the bearer
    /// token.
    ///
    /// # Errors
    ///
    /// Challenge errors from verification, [`AuthError::UserNotFound`],
    /// [`AuthError::MissingUserAgent`], or
    /// [`AuthError::SecretNotConfigured`] from token issuance.
    pub async fn complete_login(
        &self,
        public_key: &str,
        code: &str,
        signature: &str,
        device: &str,
        user_agent: &str,
    ) -> Result<LoginGrant, AuthError> {
        self.challenges
            .verify(
                code,
                public_key,
                signature,
                ChallengeFlow::Login,
                AUTH_TYPE_MNEMONIC,
            )
            .await?;

        let user = self
            .store
            .find_user_by_public_key(public_key)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.store
            .touch_last_login(user.id, self.clock.now())
            .await?;

        let session = self.sessions.create(user.id, device, user_agent).await?;
        let token = self.tokens.encode(session.id)?;

        Ok(LoginGrant {
            user,
            session,
            token,
        })
    }

    /// Resolve the caller's session from an `Authorization` header value,
    /// renewing it on the way.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthorized`] for a missing or malformed header,
    /// [`AuthError::InvalidToken`] when the token does not verify, and
    /// [`AuthError::SessionNotFound`] when the referenced session is missing
    /// or expired.
    pub async fn authenticate_bearer(
        &self,
        authorization: Option<&str>,
    ) -> Result<Session, AuthError> {
        let token = extract_bearer(authorization).ok_or(AuthError::Unauthorized)?;

        let claims = self.tokens.decode(&token).ok_or(AuthError::InvalidToken)?;

        self.sessions
            .get_and_bump(claims.sid)
            .await?
            .ok_or(AuthError::SessionNotFound)
    }

    /// Drop the caller's session, if the presented token resolves to one.
    /// Best-effort and idempotent: an unusable token is not an error, the
    /// credential is simply already dead.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn logout(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = extract_bearer(authorization) else {
            return Ok(());
        };
        let Some(claims) = self.tokens.decode(&token) else {
            return Ok(());
        };
        self.store.delete_session(claims.sid).await?;
        Ok(())
    }
}

fn extract_bearer(authorization: Option<&str>) -> Option<String> {
    let value = authorization?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
