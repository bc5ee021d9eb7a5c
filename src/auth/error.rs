//! Error taxonomy for authentication flows.
//!
//! Expected, recoverable conditions (missing or expired credentials, bad
//! signatures) are variants the caller matches on; infrastructure faults
//! (store unreachable) travel in the `Store` variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Challenge code is absent: never issued, expired away, or already
    /// consumed. Deliberately indistinguishable from "never existed".
    #[error("invalid challenge code")]
    ChallengeNotFound,
    /// Challenge exists but was issued for a different flow or auth type.
    #[error("invalid challenge flow or auth type")]
    ChallengeMismatch,
    #[error("challenge code expired")]
    ChallengeExpired,
    /// Signature verification failed, or the key/signature did not decode.
    #[error("invalid signature")]
    InvalidSignature,
    #[error("no user agent provided")]
    MissingUserAgent,
    /// Bearer header is missing or not of the form `Bearer <token>`.
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid token")]
    InvalidToken,
    #[error("session not found or expired")]
    SessionNotFound,
    #[error("user cannot be found")]
    UserNotFound,
    #[error("token secret is not configured")]
    SecretNotConfigured,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AuthError {
    /// True for failures caused by the credentials a caller presented, as
    /// opposed to validation or server-side faults. These map to a uniform
    /// response so callers cannot probe which check failed.
    #[must_use]
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::ChallengeNotFound
                | Self::ChallengeMismatch
                | Self::ChallengeExpired
                | Self::InvalidSignature
                | Self::Unauthorized
                | Self::InvalidToken
                | Self::SessionNotFound
                | Self::UserNotFound
        )
    }
}
