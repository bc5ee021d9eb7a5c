//! Compact signed session tokens (HS256).
//!
//! The token is a three-segment `header.claims.signature` credential, each
//! segment base64url without padding. Claims carry only the session id; the
//! token itself never expires because liveness is delegated to the session
//! row it references.
//!
//! Verification failure is not an error: a token that does not verify is the
//! same as presenting no credential at all, so `decode` returns an `Option`.

use anyhow::Context;
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use super::error::AuthError;

const ALG: &str = "HS256";
const TYP: &str = "JWT";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sid: Uuid,
}

pub struct SessionTokenCodec {
    secret: Option<SecretString>,
}

impl SessionTokenCodec {
    #[must_use]
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Issue a token binding the session id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SecretNotConfigured`] when no signing secret is
    /// available.
    pub fn encode(&self, session_id: Uuid) -> Result<String, AuthError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or(AuthError::SecretNotConfigured)?;

        let header = b64e_json(&TokenHeader::hs256())?;
        let claims = b64e_json(&SessionClaims { sid: session_id })?;
        let signing_input = format!("{header}.{claims}");

        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .context("failed to key token mac")?;
        mac.update(signing_input.as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return its claims. Any failure (malformed token,
    /// wrong algorithm, bad signature, missing secret) is `None`.
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        let secret = self.secret.as_ref()?;

        let mut segments = token.split('.');
        let header_b64 = segments.next()?;
        let claims_b64 = segments.next()?;
        let signature_b64 = segments.next()?;
        if segments.next().is_some() {
            return None;
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG || header.typ != TYP {
            return None;
        }

        let signature = Base64UrlUnpadded::decode_vec(signature_b64).ok()?;
        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        // Constant-time comparison via the mac itself.
        mac.verify_slice(&signature).ok()?;

        b64d_json(claims_b64)
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value).context("failed to encode token segment")?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Option<T> {
    let bytes = Base64UrlUnpadded::decode_vec(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
