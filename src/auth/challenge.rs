//! Single-use challenge codes.

use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;

use super::clock::Clock;
use super::error::AuthError;
use super::models::{ChallengeCode, ChallengeFlow};
use super::signature;
use super::store::AuthStore;

pub struct ChallengeService {
    store: Arc<dyn AuthStore>,
    clock: Arc<dyn Clock>,
    ttl_seconds: i64,
}

impl ChallengeService {
    #[must_use]
    pub fn new(store: Arc<dyn AuthStore>, clock: Arc<dyn Clock>, ttl_seconds: i64) -> Self {
        Self {
            store,
            clock,
            ttl_seconds,
        }
    }

    /// Issue a fresh challenge code for the given flow and auth type.
    ///
    /// # Errors
    ///
    /// Returns an error when code generation or the store write fails.
    pub async fn create(
        &self,
        flow: ChallengeFlow,
        auth_type: &str,
    ) -> Result<ChallengeCode, AuthError> {
        let now = self.clock.now();
        let challenge = ChallengeCode {
            code: generate_code()?,
            flow,
            auth_type: auth_type.to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds),
        };

        self.store.insert_challenge(&challenge).await?;

        Ok(challenge)
    }

    /// Verify a signed challenge response and consume the code.
    ///
    /// The checks run in a fixed order: existence, `(flow, auth type)`
    /// binding, expiry, then the signature over the literal code bytes.
    /// Consumption happens last and is conditional: whoever actually deleted
    /// the row wins, so a code never verifies twice even under concurrent
    /// attempts. A mismatched flow or auth type leaves the code consumable.
    ///
    /// # Errors
    ///
    /// [`AuthError::ChallengeNotFound`], [`AuthError::ChallengeMismatch`],
    /// [`AuthError::ChallengeExpired`], or [`AuthError::InvalidSignature`],
    /// matching the failed check.
    pub async fn verify(
        &self,
        code: &str,
        public_key: &str,
        signature: &str,
        flow: ChallengeFlow,
        auth_type: &str,
    ) -> Result<(), AuthError> {
        let challenge = self
            .store
            .get_challenge(code)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;

        if challenge.flow != flow || challenge.auth_type != auth_type {
            return Err(AuthError::ChallengeMismatch);
        }

        if self.clock.now() >= challenge.expires_at {
            return Err(AuthError::ChallengeExpired);
        }

        if !signature::verify_detached(&challenge.code, public_key, signature) {
            return Err(AuthError::InvalidSignature);
        }

        // Losing a consumption race is reported as NotFound: to this caller
        // the code no longer exists.
        self.store
            .consume_challenge(code)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;

        Ok(())
    }
}

/// 32 bytes of OS randomness, base64url encoded. The raw value is only ever
/// held by the client that requested it.
fn generate_code() -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate challenge code")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
