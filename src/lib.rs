//! # Atesto (Proof-of-key Authentication Authority)
//!
//! `atesto` authenticates clients that prove control of an Ed25519 keypair
//! instead of presenting a password. The flow is challenge-response: the
//! server issues a single-use, expiring challenge code, the client signs the
//! code with its private key, and the server verifies the detached signature
//! against the claimed public key before opening a session.
//!
//! ## Challenges
//!
//! Challenge codes are 32 bytes of OS randomness, bound to the flow
//! (`login` or `registration`) and authentication method they were issued
//! for, and expire after ten minutes. A code is consumed atomically on its
//! first successful verification; concurrent attempts have at most one
//! winner.
//!
//! ## Sessions & Tokens
//!
//! Sessions use sliding expiration: every authenticated request renews the
//! 21-day window. The bearer token is a compact HMAC-SHA256 signed credential
//! carrying only the session id; token liveness is delegated entirely to the
//! session row, so an expired session invalidates its tokens without any
//! revocation list.
//!
//! Credential failures are deliberately indistinguishable to callers:
//! missing, mismatched, expired, and badly-signed challenges all produce the
//! same response, with the specific cause visible only in server logs.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
