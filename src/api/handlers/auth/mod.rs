//! Challenge-response authentication endpoints.
//!
//! Credential failures are mapped to one uniform 401 body regardless of
//! which check failed (missing vs expired vs mismatched challenge, bad
//! signature, unknown user); the specific cause only reaches the logs.

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::{AuthError, AuthService};

pub(crate) mod types;

use types::{
    ChallengeResponse, LoginCompleteRequest, LoginCompleteResponse, LoginStartRequest, SessionView,
};

const DEVICE_MAX_CHARS: usize = 500;

#[utoipa::path(
    post,
    path = "/auth/register/start",
    responses(
        (status = 200, description = "Registration challenge issued", body = ChallengeResponse)
    ),
    tag = "auth"
)]
pub async fn register_start(auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    match auth.start_registration().await {
        Ok(challenge) => Json(ChallengeResponse {
            challenge: challenge.code,
        })
        .into_response(),
        Err(err) => failure_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login/start",
    request_body = LoginStartRequest,
    responses(
        (status = 200, description = "Login challenge issued", body = ChallengeResponse),
        (status = 400, description = "Malformed request body", body = String),
        (status = 401, description = "Authentication failed", body = String)
    ),
    tag = "auth"
)]
pub async fn login_start(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginStartRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid request body".to_string(),
        )
            .into_response();
    };

    match auth.start_login(&request.public_key).await {
        Ok(challenge) => Json(ChallengeResponse {
            challenge: challenge.code,
        })
        .into_response(),
        Err(err) => failure_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login/complete",
    request_body = LoginCompleteRequest,
    responses(
        (status = 200, description = "Login completed", body = LoginCompleteResponse),
        (status = 400, description = "Malformed request body", body = String),
        (status = 401, description = "Authentication failed", body = String)
    ),
    tag = "auth"
)]
pub async fn login_complete(
    headers: HeaderMap,
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginCompleteRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid request body".to_string(),
        )
            .into_response();
    };

    let device_chars = request.device.chars().count();
    if device_chars == 0 || device_chars > DEVICE_MAX_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid request body".to_string(),
        )
            .into_response();
    }

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    match auth
        .complete_login(
            &request.public_key,
            &request.challenge.code,
            &request.challenge.signature,
            &request.device,
            user_agent,
        )
        .await
    {
        Ok(grant) => Json(LoginCompleteResponse {
            user: grant.user.into(),
            session: grant.session.into(),
            token: grant.token,
        })
        .into_response(),
        Err(err) => failure_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Session is active and was renewed", body = SessionView),
        (status = 401, description = "Unauthenticated", body = String)
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    match auth.authenticate_bearer(bearer_header(&headers)).await {
        Ok(session) => Json(SessionView::from(session)).into_response(),
        Err(err) => failure_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    // Always 204: logging out an already-dead credential is not an error.
    if let Err(err) = auth.logout(bearer_header(&headers)).await {
        error!("Failed to delete session: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn bearer_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

/// Map an auth error onto the wire. Credential failures share one body so
/// callers cannot tell which check rejected them.
fn failure_response(err: &AuthError) -> axum::response::Response {
    if err.is_credential_failure() {
        debug!("Authentication failure: {err}");
        return (
            StatusCode::UNAUTHORIZED,
            "Authentication failed".to_string(),
        )
            .into_response();
    }

    match err {
        AuthError::MissingUserAgent => (
            StatusCode::BAD_REQUEST,
            "No user agent provided".to_string(),
        )
            .into_response(),
        AuthError::SecretNotConfigured => {
            error!("Token secret is not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server misconfigured".to_string(),
            )
                .into_response()
        }
        err => {
            error!("Authentication request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::AuthConfig;
    use crate::auth::models::UserRecord;
    use crate::auth::store::{AuthStore, MemoryStore};
    use crate::auth::SystemClock;
    use anyhow::Result;
    use axum::http::HeaderValue;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use ed25519_dalek::{Signer, SigningKey};
    use secrecy::SecretString;
    use serde_json::json;
    use types::ChallengeAnswer;
    use uuid::Uuid;

    struct Fixture {
        auth: Extension<Arc<AuthService>>,
        signing_key: SigningKey,
        public_key: String,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let public_key = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().to_bytes());

        store
            .insert_user(UserRecord {
                id: Uuid::new_v4(),
                public_key: public_key.clone(),
                namespace: None,
                profile: json!({}),
                permissions: json!([]),
            })
            .await;

        let config = AuthConfig::new(Some(SecretString::from("sikreta".to_string())));
        let service = AuthService::new(
            store as Arc<dyn AuthStore>,
            Arc::new(SystemClock),
            config,
        );

        Fixture {
            auth: Extension(Arc::new(service)),
            signing_key,
            public_key,
        }
    }

    async fn body_json(response: axum::response::Response) -> Result<serde_json::Value> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn register_start_issues_challenge() -> Result<()> {
        let fixture = fixture().await;
        let response = register_start(fixture.auth.clone()).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await?;
        assert!(body["challenge"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn login_start_missing_payload() {
        let fixture = fixture().await;
        let response = login_start(fixture.auth.clone(), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_start_unknown_key_is_uniform_401() -> Result<()> {
        let fixture = fixture().await;
        let response = login_start(
            fixture.auth.clone(),
            Some(Json(LoginStartRequest {
                public_key: "dW5rbm93bg".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"Authentication failed");
        Ok(())
    }

    #[tokio::test]
    async fn login_complete_full_flow() -> Result<()> {
        let fixture = fixture().await;

        let start = login_start(
            fixture.auth.clone(),
            Some(Json(LoginStartRequest {
                public_key: fixture.public_key.clone(),
            })),
        )
        .await
        .into_response();
        let code = body_json(start).await?["challenge"]
            .as_str()
            .expect("challenge code")
            .to_string();

        let signature = URL_SAFE_NO_PAD.encode(fixture.signing_key.sign(code.as_bytes()).to_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("test-agent"));

        let response = login_complete(
            headers,
            fixture.auth.clone(),
            Some(Json(LoginCompleteRequest {
                public_key: fixture.public_key.clone(),
                challenge: ChallengeAnswer {
                    code: code.clone(),
                    signature,
                },
                device: "desktop".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await?;
        assert_eq!(body["user"]["publicKey"], json!(fixture.public_key));
        assert_eq!(body["session"]["device"], json!("desktop"));
        assert_eq!(body["session"]["userAgent"], json!("test-agent"));
        let token = body["token"].as_str().expect("token").to_string();

        // The token authenticates the session endpoint.
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        let response = session(headers, fixture.auth.clone()).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn login_complete_rejects_oversized_device() {
        let fixture = fixture().await;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("test-agent"));

        let response = login_complete(
            headers,
            fixture.auth.clone(),
            Some(Json(LoginCompleteRequest {
                public_key: fixture.public_key.clone(),
                challenge: ChallengeAnswer {
                    code: "code".to_string(),
                    signature: "sig".to_string(),
                },
                device: "x".repeat(501),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_complete_requires_user_agent() -> Result<()> {
        let fixture = fixture().await;

        let start = login_start(
            fixture.auth.clone(),
            Some(Json(LoginStartRequest {
                public_key: fixture.public_key.clone(),
            })),
        )
        .await
        .into_response();
        let code = body_json(start).await?["challenge"]
            .as_str()
            .expect("challenge code")
            .to_string();
        let signature = URL_SAFE_NO_PAD.encode(fixture.signing_key.sign(code.as_bytes()).to_bytes());

        let response = login_complete(
            HeaderMap::new(),
            fixture.auth.clone(),
            Some(Json(LoginCompleteRequest {
                public_key: fixture.public_key.clone(),
                challenge: ChallengeAnswer {
                    code,
                    signature,
                },
                device: "desktop".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn session_without_bearer_is_401() {
        let fixture = fixture().await;
        let response = session(HeaderMap::new(), fixture.auth.clone())
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let fixture = fixture().await;
        let response = logout(HeaderMap::new(), fixture.auth.clone())
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
