//! Authentication configuration.

use secrecy::SecretString;

const DEFAULT_CHALLENGE_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 21 * 24 * 60 * 60;

#[derive(Debug)]
pub struct AuthConfig {
    token_secret: Option<SecretString>,
    challenge_ttl_seconds: i64,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    /// The secret signs session tokens. It may be absent: every operation
    /// except token issuance/verification still works without it.
    #[must_use]
    pub fn new(token_secret: Option<SecretString>) -> Self {
        Self {
            token_secret,
            challenge_ttl_seconds: DEFAULT_CHALLENGE_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_challenge_ttl_seconds(mut self, seconds: i64) -> Self {
        self.challenge_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn challenge_ttl_seconds(&self) -> i64 {
        self.challenge_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn into_token_secret(self) -> Option<SecretString> {
        self.token_secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = AuthConfig::new(None);
        assert_eq!(config.challenge_ttl_seconds(), 600);
        assert_eq!(config.session_ttl_seconds(), 1_814_400);
    }

    #[test]
    fn builders_override_ttls() {
        let config = AuthConfig::new(None)
            .with_challenge_ttl_seconds(30)
            .with_session_ttl_seconds(3600);
        assert_eq!(config.challenge_ttl_seconds(), 30);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }
}
