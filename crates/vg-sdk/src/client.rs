use tokio::net::TcpStream;
use vg_protocol::{
    keys, methods, DownloadVideoRequest, FrameReader, FrameWriter, GetUserProfileRequest,
    GetUserProfileResponse, Metadata, RpcCodec, RpcFrame, RpcMessage, SignInRequest,
    SignUpRequest, UploadVideoRequest, UploadVideoResponse,
};
use vg_types::VideoMetadata;

use crate::error::{SdkError, SdkResult};

/// Upload slice size used when the caller does not pick one.
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 1024 * 1024;

/// A completed download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedVideo {
    pub metadata: VideoMetadata,
    pub data: Vec<u8>,
    /// Number of chunks the server sent.
    pub chunks: usize,
}

/// Everything the server sent on a successful call.
struct CallReply {
    headers: Metadata,
    messages: Vec<RpcMessage>,
}

/// Client for a videogate server.
///
/// Each method opens a fresh connection for its call. After
/// [`VideoClient::sign_in`] the token is attached to every later call.
#[derive(Clone, Debug)]
pub struct VideoClient {
    addr: String,
    codec: RpcCodec,
    token: Option<String>,
    identity_hint: Option<(String, String)>,
}

impl VideoClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            codec: RpcCodec::default(),
            token: None,
            identity_hint: None,
        }
    }

    /// Use an existing bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Send `user-id` / `user-name` hints on uploads.
    ///
    /// The server only uses them when the call carries no verified identity.
    pub fn with_identity_hint(mut self, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        self.identity_hint = Some((user_id.into(), user_name.into()));
        self
    }

    pub fn with_codec(mut self, codec: RpcCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Register a user. Returns the assigned user id.
    pub async fn sign_up(&self, username: &str, password: &str) -> SdkResult<String> {
        let request = RpcMessage::SignUpRequest(SignUpRequest {
            username: username.into(),
            password: password.into(),
        });
        let reply = self.call(methods::SIGN_UP, Metadata::new(), vec![request]).await?;
        match single(reply.messages)? {
            RpcMessage::SignUpResponse(response) => Ok(response.user_id),
            other => Err(unexpected(&other)),
        }
    }

    /// Sign in and remember the issued token.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> SdkResult<String> {
        let request = RpcMessage::SignInRequest(SignInRequest {
            username: username.into(),
            password: password.into(),
        });
        let reply = self.call(methods::SIGN_IN, Metadata::new(), vec![request]).await?;
        let echoed = reply.headers.get(keys::AUTH_TOKEN).map(str::to_string);
        let token = match single(reply.messages)? {
            RpcMessage::SignInResponse(response) => response.token,
            other => return Err(unexpected(&other)),
        };
        if echoed.as_deref().is_some_and(|h| h != token) {
            tracing::warn!("x-auth-token header differs from the response token");
        }
        self.token = Some(token.clone());
        Ok(token)
    }

    pub async fn get_user_profile(&self) -> SdkResult<GetUserProfileResponse> {
        let request = RpcMessage::GetUserProfileRequest(GetUserProfileRequest::default());
        let reply = self
            .call(methods::GET_USER_PROFILE, self.authorized()?, vec![request])
            .await?;
        match single(reply.messages)? {
            RpcMessage::GetUserProfileResponse(response) => Ok(response),
            other => Err(unexpected(&other)),
        }
    }

    /// Upload `data` under `video_id`, split into `chunk_size` slices.
    pub async fn upload_video(&self, video_id: &str, data: &[u8], chunk_size: usize) -> SdkResult<UploadVideoResponse> {
        if chunk_size == 0 {
            return Err(SdkError::InvalidChunkSize);
        }
        let chunks = data
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, piece)| UploadVideoRequest {
                video_id: video_id.into(),
                data: piece.to_vec(),
                sequence: i as i64 + 1,
            })
            .collect();
        self.upload_chunks(chunks).await
    }

    /// Upload pre-built chunks exactly as given.
    pub async fn upload_chunks(&self, chunks: Vec<UploadVideoRequest>) -> SdkResult<UploadVideoResponse> {
        let mut metadata = self.authorized_or_anonymous();
        if let Some((user_id, user_name)) = &self.identity_hint {
            metadata.insert(keys::USER_ID, user_id.clone());
            metadata.insert(keys::USER_NAME, user_name.clone());
        }
        let requests = chunks.into_iter().map(RpcMessage::UploadVideoRequest).collect();
        let reply = self.call(methods::UPLOAD_VIDEO, metadata, requests).await?;
        match single(reply.messages)? {
            RpcMessage::UploadVideoResponse(response) => Ok(response),
            other => Err(unexpected(&other)),
        }
    }

    /// Download a video and reassemble its chunks.
    pub async fn download_video(&self, video_id: &str) -> SdkResult<DownloadedVideo> {
        let request = RpcMessage::DownloadVideoRequest(DownloadVideoRequest {
            video_id: video_id.into(),
        });
        let reply = self
            .call(methods::DOWNLOAD_VIDEO, self.authorized()?, vec![request])
            .await?;
        reassemble(reply.messages)
    }

    fn authorized(&self) -> SdkResult<Metadata> {
        let token = self.token.as_deref().ok_or(SdkError::NotSignedIn)?;
        Ok(Metadata::new().with_bearer(token))
    }

    fn authorized_or_anonymous(&self) -> Metadata {
        match &self.token {
            Some(token) => Metadata::new().with_bearer(token),
            None => Metadata::new(),
        }
    }

    /// Run one call: open, send every request, half-close, then read
    /// headers, messages and the final status.
    async fn call(&self, method: &str, metadata: Metadata, requests: Vec<RpcMessage>) -> SdkResult<CallReply> {
        let stream = TcpStream::connect(&self.addr).await?;
        stream.set_nodelay(true)?;
        let (read, write) = stream.into_split();
        let mut writer = FrameWriter::new(write, self.codec);
        let mut reader = FrameReader::new(read, self.codec);

        let open = RpcFrame::Open {
            method: method.to_string(),
            metadata,
        };
        // A server that rejects the call stops reading; its status is still
        // waiting on the read side.
        let mut send_error = None;
        let frames = std::iter::once(open)
            .chain(requests.into_iter().map(RpcFrame::Message))
            .chain(std::iter::once(RpcFrame::HalfClose));
        for frame in frames {
            if let Err(e) = writer.write_frame(&frame).await {
                send_error = Some(e);
                break;
            }
        }
        let _ = writer.shutdown().await;

        let mut reply = CallReply {
            headers: Metadata::new(),
            messages: Vec::new(),
        };
        loop {
            let frame = match reader.read_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => return Err(send_error.unwrap_or(e).into()),
            };
            match frame {
                RpcFrame::Headers { metadata } => reply.headers = metadata,
                RpcFrame::Message(message) => reply.messages.push(message),
                RpcFrame::Status(status) if status.is_ok() => return Ok(reply),
                RpcFrame::Status(status) => {
                    tracing::debug!(method, code = %status.code, "call failed");
                    return Err(SdkError::Status(status));
                }
                other => {
                    return Err(SdkError::UnexpectedResponse(format!(
                        "{} frame from server",
                        other.type_name()
                    )))
                }
            }
        }
        match send_error {
            Some(e) => Err(e.into()),
            None => Err(SdkError::UnexpectedResponse("connection closed before status".into())),
        }
    }
}

/// Join download chunks. Metadata must arrive on the first chunk and only
/// there.
fn reassemble(messages: Vec<RpcMessage>) -> SdkResult<DownloadedVideo> {
    let mut metadata = None;
    let mut data = Vec::new();
    let mut chunks = 0;
    for message in messages {
        let chunk = match message {
            RpcMessage::DownloadVideoResponse(chunk) => chunk,
            other => return Err(unexpected(&other)),
        };
        match (chunks, chunk.metadata) {
            (0, Some(m)) => metadata = Some(m),
            (0, None) => {
                return Err(SdkError::UnexpectedResponse("first chunk carried no metadata".into()))
            }
            (n, Some(_)) => {
                return Err(SdkError::UnexpectedResponse(format!("metadata repeated on chunk {}", n + 1)))
            }
            (_, None) => {}
        }
        data.extend_from_slice(&chunk.data);
        chunks += 1;
    }
    let metadata = metadata
        .ok_or_else(|| SdkError::UnexpectedResponse("download carried no chunks".into()))?;
    Ok(DownloadedVideo { metadata, data, chunks })
}

fn single(mut messages: Vec<RpcMessage>) -> SdkResult<RpcMessage> {
    if messages.len() != 1 {
        return Err(SdkError::UnexpectedResponse(format!(
            "expected one response message, got {}",
            messages.len()
        )));
    }
    messages
        .pop()
        .ok_or_else(|| SdkError::UnexpectedResponse("missing response message".into()))
}

fn unexpected(message: &RpcMessage) -> SdkError {
    SdkError::UnexpectedResponse(message.type_name().to_string())
}
