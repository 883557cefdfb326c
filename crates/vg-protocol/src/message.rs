use serde::{Deserialize, Serialize};
use vg_types::VideoMetadata;

use crate::metadata::Metadata;
use crate::status::Status;

/// Default cap on a single frame payload. Comfortably above one download
/// chunk plus its metadata.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserProfileRequest {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserProfileResponse {
    pub user_id: String,
    pub username: String,
}

/// One chunk of a client-streamed upload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadVideoRequest {
    pub video_id: String,
    pub data: Vec<u8>,
    /// Caller-assigned label. Not used for ordering.
    pub sequence: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadVideoResponse {
    pub video_id: String,
    pub total_bytes: u64,
    pub metadata: VideoMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadVideoRequest {
    pub video_id: String,
}

/// One chunk of a server-streamed download.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadVideoResponse {
    pub video_id: String,
    pub data: Vec<u8>,
    pub sequence: i64,
    /// Present on the first chunk only.
    pub metadata: Option<VideoMetadata>,
}

// Payloads can be megabytes; print their length instead.
impl std::fmt::Debug for UploadVideoRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadVideoRequest")
            .field("video_id", &self.video_id)
            .field("data_len", &self.data.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl std::fmt::Debug for DownloadVideoResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadVideoResponse")
            .field("video_id", &self.video_id)
            .field("data_len", &self.data.len())
            .field("sequence", &self.sequence)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Every request and response body in the protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMessage {
    SignUpRequest(SignUpRequest),
    SignUpResponse(SignUpResponse),
    SignInRequest(SignInRequest),
    SignInResponse(SignInResponse),
    GetUserProfileRequest(GetUserProfileRequest),
    GetUserProfileResponse(GetUserProfileResponse),
    UploadVideoRequest(UploadVideoRequest),
    UploadVideoResponse(UploadVideoResponse),
    DownloadVideoRequest(DownloadVideoRequest),
    DownloadVideoResponse(DownloadVideoResponse),
}

impl RpcMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SignUpRequest(_) => "SignUpRequest",
            Self::SignUpResponse(_) => "SignUpResponse",
            Self::SignInRequest(_) => "SignInRequest",
            Self::SignInResponse(_) => "SignInResponse",
            Self::GetUserProfileRequest(_) => "GetUserProfileRequest",
            Self::GetUserProfileResponse(_) => "GetUserProfileResponse",
            Self::UploadVideoRequest(_) => "UploadVideoRequest",
            Self::UploadVideoResponse(_) => "UploadVideoResponse",
            Self::DownloadVideoRequest(_) => "DownloadVideoRequest",
            Self::DownloadVideoResponse(_) => "DownloadVideoResponse",
        }
    }
}

/// A unit on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcFrame {
    /// First client frame: which method, with which headers.
    Open { method: String, metadata: Metadata },
    /// First server frame: response headers.
    Headers { metadata: Metadata },
    Message(RpcMessage),
    /// The client has no more messages to send.
    HalfClose,
    /// Last server frame.
    Status(Status),
}

impl RpcFrame {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Open { .. } => 1,
            Self::Headers { .. } => 2,
            Self::Message(_) => 3,
            Self::HalfClose => 4,
            Self::Status(_) => 5,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "Open",
            Self::Headers { .. } => "Headers",
            Self::Message(_) => "Message",
            Self::HalfClose => "HalfClose",
            Self::Status(_) => "Status",
        }
    }

    /// Returns `true` if `tag` names a frame type.
    pub fn is_known_tag(tag: u8) -> bool {
        (1..=5).contains(&tag)
    }
}
