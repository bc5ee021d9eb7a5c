//! Challenge-response authentication and session lifecycle.
//!
//! This module is the core of the service. The building blocks are:
//!
//! - [`challenge::ChallengeService`] issues and consumes single-use challenge
//!   codes bound to a `(flow, auth type)` pair.
//! - [`signature`] verifies detached Ed25519 signatures over challenge codes.
//! - [`session::SessionService`] creates sessions and renews them with
//!   sliding expiration on every authenticated access.
//! - [`token::SessionTokenCodec`] issues and verifies the HMAC-SHA256 signed
//!   bearer token binding a session id.
//! - [`service::AuthService`] composes the above into the login and bearer
//!   authentication contracts the HTTP handlers rely on.
//!
//! Time comes from an injected [`clock::Clock`] and persistence from an
//! injected [`store::AuthStore`], so every invariant here is testable against
//! the in-memory store with a manual clock.

pub mod challenge;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod session;
pub mod signature;
pub mod store;
pub mod token;

pub use challenge::ChallengeService;
pub use clock::{Clock, SystemClock};
pub use config::AuthConfig;
pub use error::AuthError;
pub use models::{ChallengeCode, ChallengeFlow, LoginGrant, Session, UserRecord};
pub use service::AuthService;
pub use session::SessionService;
pub use store::AuthStore;
pub use token::{SessionClaims, SessionTokenCodec};
