use std::sync::Arc;

use vg_auth::{CredentialStore, TokenService};
use vg_protocol::{
    CallContext, GetUserProfileResponse, SignInRequest, SignInResponse, SignUpRequest,
    SignUpResponse, Status,
};

use crate::error::{ServerError, ServerResult};

/// SignUp, SignIn and GetUserProfile.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, tokens: Arc<TokenService>) -> Self {
        Self { credentials, tokens }
    }

    /// Register a user and return the assigned id.
    pub async fn sign_up(&self, request: SignUpRequest) -> ServerResult<SignUpResponse> {
        let credentials = Arc::clone(&self.credentials);
        // Argon2 is CPU-bound.
        let user_id = tokio::task::spawn_blocking(move || {
            credentials.create(&request.username, &request.password)
        })
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

        tracing::info!(user_id = %user_id, "user signed up");
        Ok(SignUpResponse {
            user_id: user_id.to_string(),
        })
    }

    /// Check a password and issue a bearer token.
    pub async fn sign_in(&self, request: SignInRequest) -> ServerResult<SignInResponse> {
        let credentials = Arc::clone(&self.credentials);
        let identity = tokio::task::spawn_blocking(move || {
            credentials.verify(&request.username, &request.password)
        })
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

        let issued = self.tokens.issue(&identity)?;
        tracing::info!(user = %identity, expires_at = %issued.expires_at, "user signed in");
        Ok(SignInResponse {
            token: issued.token,
        })
    }

    /// Echo the caller's identity after confirming the account still exists.
    pub fn get_user_profile(&self, ctx: &CallContext) -> ServerResult<GetUserProfileResponse> {
        let identity = ctx
            .identity()
            .ok_or_else(|| Status::unauthenticated("missing identity"))?;
        let record = self.credentials.lookup(&identity.username)?;
        match record {
            Some(record) if record.id == identity.user_id => Ok(GetUserProfileResponse {
                user_id: record.id.to_string(),
                username: record.username,
            }),
            _ => Err(Status::unauthenticated("user not found").into()),
        }
    }
}
