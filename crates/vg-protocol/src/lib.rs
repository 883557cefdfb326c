//! Wire protocol for videogate.
//!
//! Defines the framing, message types, call metadata and status codes used
//! between videogate clients and servers, plus the async frame transport
//! both sides run over a byte stream.
//!
//! A call is one connection: the client sends `Open`, its request
//! message(s) and `HalfClose`; the server answers with `Headers`, its
//! response message(s) and a terminal `Status`.

pub mod codec;
pub mod context;
pub mod error;
pub mod message;
pub mod metadata;
pub mod method;
pub mod status;
pub mod transport;

pub use codec::RpcCodec;
pub use context::CallContext;
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    DownloadVideoRequest, DownloadVideoResponse, GetUserProfileRequest, GetUserProfileResponse,
    RpcFrame, RpcMessage, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
    UploadVideoRequest, UploadVideoResponse, MAX_MESSAGE_SIZE,
};
pub use metadata::{keys, Metadata};
pub use method::{methods, CallShape, MethodDescriptor};
pub use status::{Code, Status};
pub use transport::{FrameReader, FrameWriter};
