//! JSON-over-HTTP gateway for the auth methods.
//!
//! Every route opens a call on the shared [`Dispatcher`], so the same
//! interceptor and handlers run as on the RPC listener.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use vg_protocol::{
    keys, methods, Code, GetUserProfileResponse, Metadata, SignInRequest, SignUpRequest,
    SignUpResponse,
};

use crate::dispatch::Dispatcher;
use crate::error::{ServerError, ServerResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of every failed gateway response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A handler failure, rendered as `{code, message}`.
#[derive(Debug)]
pub struct GatewayError(ServerError);

impl From<ServerError> for GatewayError {
    fn from(e: ServerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.0.to_status();
        tracing::warn!(error = %self.0, code = %status.code, "gateway call failed");
        let body = ErrorBody {
            code: status.code.as_str().to_string(),
            message: status.message,
        };
        (http_status(status.code), Json(body)).into_response()
    }
}

type GatewayResult<T> = Result<T, GatewayError>;

/// HTTP status for a call status code.
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the gateway router.
pub fn build_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/auth/signup", post(sign_up))
        .route("/v1/auth/signin", post(sign_in))
        .route("/v1/auth/profile", get(profile))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

/// Serve the gateway until the listener fails.
pub async fn serve_gateway(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> ServerResult<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("HTTP gateway listening on {addr}");
    }
    axum::serve(listener, build_router(dispatcher))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}

fn call_metadata(headers: &HeaderMap) -> Metadata {
    let mut metadata = Metadata::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            metadata.append(name.as_str(), value);
        }
    }
    metadata
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn sign_up(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    Json(request): Json<SignUpRequest>,
) -> GatewayResult<Json<SignUpResponse>> {
    dispatcher.open_call(methods::SIGN_UP, call_metadata(&headers))?;
    Ok(Json(dispatcher.auth().sign_up(request).await?))
}

async fn sign_in(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    Json(request): Json<SignInRequest>,
) -> GatewayResult<impl IntoResponse> {
    dispatcher.open_call(methods::SIGN_IN, call_metadata(&headers))?;
    let response = dispatcher.auth().sign_in(request).await?;
    Ok(([(keys::AUTH_TOKEN, response.token.clone())], Json(response)))
}

async fn profile(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
) -> GatewayResult<Json<GetUserProfileResponse>> {
    let ctx = dispatcher.open_call(methods::GET_USER_PROFILE, call_metadata(&headers))?;
    Ok(Json(dispatcher.auth().get_user_profile(&ctx)?))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::util::ServiceExt;
    use vg_protocol::SignInResponse;

    use super::*;
    use crate::config::ServerConfig;

    fn app() -> Router {
        let config = ServerConfig {
            jwt_secret: Some("gateway-test".into()),
            ..Default::default()
        };
        build_router(Arc::new(Dispatcher::from_config(&config)))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const ALICE: &str = r#"{"username":"alice","password":"pw"}"#;

    #[tokio::test]
    async fn health_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: HealthResponse = json(response).await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn signup_signin_profile() {
        let app = app();

        let response = app.clone().oneshot(post_json("/v1/auth/signup", ALICE)).await.unwrap();
        assert_eq!(response.status(), 200);
        let body: SignUpResponse = json(response).await;
        assert_eq!(body.user_id, "user_1");

        let response = app.clone().oneshot(post_json("/v1/auth/signin", ALICE)).await.unwrap();
        assert_eq!(response.status(), 200);
        let header = response.headers().get("x-auth-token").unwrap().to_str().unwrap().to_string();
        let body: SignInResponse = json(response).await;
        assert_eq!(header, body.token);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/auth/profile")
                    .header("authorization", format!("Bearer {}", body.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let profile: GetUserProfileResponse = json(response).await;
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.user_id, "user_1");
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let app = app();
        app.clone().oneshot(post_json("/v1/auth/signup", ALICE)).await.unwrap();
        let response = app.oneshot(post_json("/v1/auth/signup", ALICE)).await.unwrap();
        assert_eq!(response.status(), 409);
        let body: ErrorBody = json(response).await;
        assert_eq!(body.code, "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn empty_fields_are_bad_request() {
        let response = app()
            .oneshot(post_json("/v1/auth/signup", r#"{"username":"","password":""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn bad_password_unauthorized() {
        let app = app();
        app.clone().oneshot(post_json("/v1/auth/signup", ALICE)).await.unwrap();
        let response = app
            .oneshot(post_json("/v1/auth/signin", r#"{"username":"alice","password":"nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        let body: ErrorBody = json(response).await;
        assert_eq!(body.message, "invalid credentials");
    }

    #[tokio::test]
    async fn profile_requires_token() {
        let response = app()
            .oneshot(Request::builder().uri("/v1/auth/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        let body: ErrorBody = json(response).await;
        assert_eq!(body.code, "UNAUTHENTICATED");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(http_status(Code::FailedPrecondition), StatusCode::PRECONDITION_FAILED);
        assert_eq!(http_status(Code::DeadlineExceeded), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(http_status(Code::Unimplemented), StatusCode::NOT_IMPLEMENTED);
    }
}
