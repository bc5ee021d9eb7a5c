//! OpenAPI document for the service.

use utoipa::OpenApi;

use super::handlers::auth::types::{
    ChallengeAnswer, ChallengeResponse, LoginCompleteRequest, LoginCompleteResponse,
    LoginStartRequest, SessionView, UserView,
};
use super::handlers::{auth, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "atesto",
        description = "Public-key challenge-response authentication service"
    ),
    paths(
        health::health,
        auth::register_start,
        auth::login_start,
        auth::login_complete,
        auth::session,
        auth::logout,
    ),
    components(schemas(
        ChallengeAnswer,
        ChallengeResponse,
        LoginCompleteRequest,
        LoginCompleteResponse,
        LoginStartRequest,
        SessionView,
        UserView,
    )),
    tags(
        (name = "auth", description = "Challenge-response authentication and sessions"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
