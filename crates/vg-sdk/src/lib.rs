//! Client SDK for videogate.
//!
//! [`VideoClient`] speaks the framed RPC protocol to a videogate server:
//! account sign-up and sign-in, profile lookup, chunked uploads and
//! reassembled downloads.

pub mod client;
pub mod error;

pub use client::{DownloadedVideo, VideoClient, DEFAULT_UPLOAD_CHUNK_SIZE};
pub use error::{SdkError, SdkResult};

pub use vg_protocol::{Code, GetUserProfileResponse, Status, UploadVideoRequest, UploadVideoResponse};
pub use vg_types::VideoMetadata;
