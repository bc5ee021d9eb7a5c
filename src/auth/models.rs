//! Entities persisted and exchanged by the authentication core.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

/// Business context a challenge was issued for. A challenge only verifies
/// against the exact flow it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeFlow {
    Login,
    Registration,
}

impl ChallengeFlow {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Registration => "registration",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(Self::Login),
            "registration" => Some(Self::Registration),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChallengeFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-use challenge code a client must sign to prove key possession.
#[derive(Debug, Clone)]
pub struct ChallengeCode {
    pub code: String,
    pub flow: ChallengeFlow,
    pub auth_type: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ChallengeCode {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let flow: String = row.try_get("flow")?;
        let flow = ChallengeFlow::parse(&flow).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "flow".to_string(),
            source: format!("unknown challenge flow: {flow}").into(),
        })?;
        Ok(Self {
            code: row.try_get("code")?,
            flow,
            auth_type: row.try_get("auth_type")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

/// Authenticated session with sliding expiration.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user: Uuid,
    pub device: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Session {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user: row.try_get("user_id")?,
            device: row.try_get("device")?,
            user_agent: row.try_get("user_agent")?,
            created_at: row.try_get("created_at")?,
            accessed_at: row.try_get("accessed_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

/// Identity view of the user owning a public key. The user store is an
/// external collaborator; this core only looks identities up and stamps
/// their last login.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub public_key: String,
    pub namespace: Option<String>,
    pub profile: serde_json::Value,
    pub permissions: serde_json::Value,
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            public_key: row.try_get("public_key")?,
            namespace: row.try_get("namespace")?,
            profile: row.try_get("profile")?,
            permissions: row.try_get("permissions")?,
        })
    }
}

/// Everything a successful login hands back to the client.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub user: UserRecord,
    pub session: Session,
    pub token: String,
}
