use std::sync::Arc;

use vg_auth::{AuthError, TokenService};
use vg_protocol::{methods, CallContext, Status};

/// Methods callable without a bearer token.
pub const PUBLIC_METHODS: [&str; 2] = [methods::SIGN_UP, methods::SIGN_IN];

/// Runs before every handler and may replace or refuse the call context.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, ctx: CallContext) -> Result<CallContext, Status>;
}

/// Bearer-token gate for every method outside [`PUBLIC_METHODS`].
pub struct AuthInterceptor {
    tokens: Arc<TokenService>,
}

impl AuthInterceptor {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub fn is_public(path: &str) -> bool {
        PUBLIC_METHODS.contains(&path)
    }
}

impl Interceptor for AuthInterceptor {
    fn intercept(&self, ctx: CallContext) -> Result<CallContext, Status> {
        if Self::is_public(ctx.method().path) {
            return Ok(ctx);
        }

        let Some(token) = ctx.metadata().bearer_token() else {
            let message = if ctx.metadata().authorization().is_some() {
                "authorization header must use the Bearer scheme"
            } else {
                "missing authorization header"
            };
            return Err(Status::unauthenticated(message));
        };

        match self.tokens.verify(token) {
            Ok(identity) => {
                tracing::debug!(call_id = %ctx.call_id(), user = %identity, "call authenticated");
                Ok(ctx.authenticated(identity))
            }
            Err(AuthError::TokenExpired) => Err(Status::unauthenticated("token expired")),
            Err(e) => {
                tracing::debug!(call_id = %ctx.call_id(), error = %e, "token rejected");
                Err(Status::unauthenticated("invalid token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use vg_crypto::SigningSecret;
    use vg_protocol::{Code, Metadata, MethodDescriptor};
    use vg_types::{Identity, UserId};

    use super::*;

    fn service() -> Arc<TokenService> {
        Arc::new(TokenService::new(&SigningSecret::new("test-secret")))
    }

    fn ctx(path: &str, metadata: Metadata) -> CallContext {
        CallContext::new(MethodDescriptor::lookup(path).unwrap(), metadata)
    }

    fn alice() -> Identity {
        Identity::new(UserId::sequential(1), "alice")
    }

    #[test]
    fn public_methods_pass_without_token() {
        let interceptor = AuthInterceptor::new(service());
        for path in PUBLIC_METHODS {
            let out = interceptor.intercept(ctx(path, Metadata::new())).unwrap();
            assert!(out.identity().is_none());
        }
    }

    #[test]
    fn protected_methods_need_a_token() {
        let interceptor = AuthInterceptor::new(service());
        for path in [methods::GET_USER_PROFILE, methods::UPLOAD_VIDEO, methods::DOWNLOAD_VIDEO] {
            let err = interceptor.intercept(ctx(path, Metadata::new())).unwrap_err();
            assert_eq!(err.code, Code::Unauthenticated);
        }
    }

    #[test]
    fn valid_token_attaches_identity() {
        let tokens = service();
        let issued = tokens.issue(&alice()).unwrap();
        let interceptor = AuthInterceptor::new(tokens);
        let md = Metadata::new().with_bearer(&issued.token);
        let out = interceptor.intercept(ctx(methods::UPLOAD_VIDEO, md)).unwrap();
        assert_eq!(out.identity(), Some(&alice()));
    }

    #[test]
    fn raw_token_without_scheme_rejected() {
        let tokens = service();
        let issued = tokens.issue(&alice()).unwrap();
        let interceptor = AuthInterceptor::new(tokens);
        let md = Metadata::new().with("authorization", issued.token);
        let err = interceptor.intercept(ctx(methods::GET_USER_PROFILE, md)).unwrap_err();
        assert_eq!(err.message, "authorization header must use the Bearer scheme");
    }

    #[test]
    fn foreign_and_expired_tokens_rejected() {
        let other = TokenService::new(&SigningSecret::new("other-secret"));
        let forged = other.issue(&alice()).unwrap();
        let tokens = service();
        let stale = tokens.issue_at(&alice(), Utc::now() - Duration::days(2)).unwrap();
        let interceptor = AuthInterceptor::new(tokens);

        let err = interceptor
            .intercept(ctx(methods::DOWNLOAD_VIDEO, Metadata::new().with_bearer(&forged.token)))
            .unwrap_err();
        assert_eq!(err, Status::unauthenticated("invalid token"));

        let err = interceptor
            .intercept(ctx(methods::DOWNLOAD_VIDEO, Metadata::new().with_bearer(&stale.token)))
            .unwrap_err();
        assert_eq!(err, Status::unauthenticated("token expired"));
    }
}
