use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Instrument;
use vg_auth::{InMemoryCredentialStore, TokenService};
use vg_protocol::{
    keys, methods, CallContext, Metadata, MethodDescriptor, RpcMessage, Status,
};
use vg_store::InMemoryObjectStore;

use crate::call::{DownloadStream, RpcCall, UploadStream};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::interceptor::{AuthInterceptor, Interceptor};
use crate::services::{AuthService, MediaService};

/// Routes opened calls through the interceptor to their handlers.
///
/// Shared by the RPC listener and the HTTP gateway.
pub struct Dispatcher {
    interceptor: Arc<dyn Interceptor>,
    auth: AuthService,
    media: MediaService,
}

impl Dispatcher {
    pub fn new(interceptor: Arc<dyn Interceptor>, auth: AuthService, media: MediaService) -> Self {
        Self {
            interceptor,
            auth,
            media,
        }
    }

    /// Wire up fresh in-memory stores and a token service from `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let tokens = Arc::new(TokenService::with_ttl(&config.signing_secret(), config.token_ttl()));
        let auth = AuthService::new(Arc::new(InMemoryCredentialStore::new()), Arc::clone(&tokens));
        let media = MediaService::new(Arc::new(InMemoryObjectStore::new()), config.download_chunk_size);
        Self::new(Arc::new(AuthInterceptor::new(tokens)), auth, media)
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Resolve the method and run the interceptor.
    ///
    /// Unknown methods fail with `Unimplemented` before authentication.
    pub fn open_call(&self, path: &str, metadata: Metadata) -> ServerResult<CallContext> {
        let ctx = self.new_context(path, metadata)?;
        let _entered = call_span(&ctx).entered();
        self.authorize(ctx)
    }

    fn new_context(&self, path: &str, metadata: Metadata) -> ServerResult<CallContext> {
        let method = MethodDescriptor::lookup(path).ok_or_else(|| {
            tracing::warn!(rpc.method = path, "unknown method");
            Status::unimplemented(format!("unknown method {path}"))
        })?;
        Ok(CallContext::new(method, metadata))
    }

    fn authorize(&self, ctx: CallContext) -> ServerResult<CallContext> {
        self.interceptor.intercept(ctx).map_err(|status| {
            tracing::debug!(code = %status.code, "call rejected: {}", status.message);
            ServerError::from(status)
        })
    }

    /// Run one call after its `Open` frame has been read, bounded by
    /// `timeout` when set.
    ///
    /// The final status is left to the caller.
    pub async fn serve_call<R, W>(
        &self,
        call: &mut RpcCall<R, W>,
        path: &str,
        metadata: Metadata,
        timeout: Option<Duration>,
    ) -> ServerResult<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let ctx = self.new_context(path, metadata)?;
        let span = call_span(&ctx);
        async {
            let served = async {
                let ctx = self.authorize(ctx)?;
                self.handle(&ctx, call).await
            };
            let outcome = match timeout {
                Some(limit) => tokio::time::timeout(limit, served)
                    .await
                    .unwrap_or_else(|_| Err(Status::deadline_exceeded("call deadline exceeded").into())),
                None => served.await,
            };
            if let Err(e) = &outcome {
                tracing::warn!(code = %e.to_status().code, error = %e, "call failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn handle<R, W>(&self, ctx: &CallContext, call: &mut RpcCall<R, W>) -> ServerResult<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        match ctx.method().path {
            methods::SIGN_UP => {
                let RpcMessage::SignUpRequest(request) = call.read_request().await? else {
                    return Err(unexpected("SignUpRequest"));
                };
                let response = self.auth.sign_up(request).await?;
                call.send_message(RpcMessage::SignUpResponse(response)).await
            }
            methods::SIGN_IN => {
                let RpcMessage::SignInRequest(request) = call.read_request().await? else {
                    return Err(unexpected("SignInRequest"));
                };
                let response = self.auth.sign_in(request).await?;
                call.send_headers(Metadata::new().with(keys::AUTH_TOKEN, response.token.clone()))
                    .await?;
                call.send_message(RpcMessage::SignInResponse(response)).await
            }
            methods::GET_USER_PROFILE => {
                let RpcMessage::GetUserProfileRequest(_) = call.read_request().await? else {
                    return Err(unexpected("GetUserProfileRequest"));
                };
                let response = self.auth.get_user_profile(ctx)?;
                call.send_message(RpcMessage::GetUserProfileResponse(response)).await
            }
            methods::UPLOAD_VIDEO => {
                let response = self.media.upload_video(ctx, &mut UploadStream(call)).await?;
                call.send_message(RpcMessage::UploadVideoResponse(response)).await
            }
            methods::DOWNLOAD_VIDEO => {
                let RpcMessage::DownloadVideoRequest(request) = call.read_request().await? else {
                    return Err(unexpected("DownloadVideoRequest"));
                };
                self.media
                    .download_video(ctx, &request, &mut DownloadStream(call))
                    .await?;
                Ok(())
            }
            other => Err(Status::unimplemented(format!("unknown method {other}")).into()),
        }
    }
}

fn call_span(ctx: &CallContext) -> tracing::Span {
    tracing::info_span!(
        "rpc",
        rpc.method = ctx.method().path,
        call_id = %ctx.call_id(),
    )
}

fn unexpected(expected: &'static str) -> ServerError {
    Status::invalid_argument(format!("expected a {expected} message")).into()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use vg_protocol::Code;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::from_config(&ServerConfig {
            jwt_secret: Some("dispatch-test".into()),
            ..Default::default()
        })
    }

    /// Run `f` with a DEBUG subscriber and return what it logged.
    fn logged<T>(f: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        (out, text)
    }

    #[test]
    fn rejection_is_logged_inside_call_span() {
        let dispatcher = dispatcher();
        let (result, logs) = logged(|| dispatcher.open_call(methods::GET_USER_PROFILE, Metadata::new()));
        assert_eq!(result.unwrap_err().to_status().code, Code::Unauthenticated);

        let line = logs.lines().find(|l| l.contains("call rejected")).unwrap();
        assert!(line.contains("rpc.method"));
        assert!(line.contains(methods::GET_USER_PROFILE));
        assert!(line.contains("call_id"));
    }

    #[test]
    fn unknown_method_fails_before_auth() {
        let dispatcher = dispatcher();
        let (result, logs) = logged(|| dispatcher.open_call("/videogate.Nope/Missing", Metadata::new()));
        assert_eq!(result.unwrap_err().to_status().code, Code::Unimplemented);
        assert!(logs.contains("unknown method"));
        assert!(logs.contains("/videogate.Nope/Missing"));
        assert!(!logs.contains("call rejected"));
    }

    #[test]
    fn public_methods_open_without_token() {
        let ctx = dispatcher().open_call(methods::SIGN_UP, Metadata::new()).unwrap();
        assert_eq!(ctx.method().path, methods::SIGN_UP);
        assert!(ctx.identity().is_none());
    }
}
