use std::fmt;

/// Fully-qualified method paths.
pub mod methods {
    pub const SIGN_UP: &str = "/auth.AuthService/SignUp";
    pub const SIGN_IN: &str = "/auth.AuthService/SignIn";
    pub const GET_USER_PROFILE: &str = "/auth.AuthService/GetUserProfile";
    pub const UPLOAD_VIDEO: &str = "/media.MediaService/UploadVideo";
    pub const DOWNLOAD_VIDEO: &str = "/media.MediaService/DownloadVideo";
}

/// How many messages flow in each direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallShape {
    Unary,
    ClientStreaming,
    ServerStreaming,
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary => write!(f, "unary"),
            Self::ClientStreaming => write!(f, "client-streaming"),
            Self::ServerStreaming => write!(f, "server-streaming"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub path: &'static str,
    pub service: &'static str,
    pub name: &'static str,
    pub shape: CallShape,
}

impl MethodDescriptor {
    const fn new(path: &'static str, service: &'static str, name: &'static str, shape: CallShape) -> Self {
        Self { path, service, name, shape }
    }

    /// Every method the server implements.
    pub const ALL: [MethodDescriptor; 5] = [
        Self::new(methods::SIGN_UP, "AuthService", "SignUp", CallShape::Unary),
        Self::new(methods::SIGN_IN, "AuthService", "SignIn", CallShape::Unary),
        Self::new(methods::GET_USER_PROFILE, "AuthService", "GetUserProfile", CallShape::Unary),
        Self::new(methods::UPLOAD_VIDEO, "MediaService", "UploadVideo", CallShape::ClientStreaming),
        Self::new(methods::DOWNLOAD_VIDEO, "MediaService", "DownloadVideo", CallShape::ServerStreaming),
    ];

    /// Find a method by its path.
    pub fn lookup(path: &str) -> Option<&'static MethodDescriptor> {
        Self::ALL.iter().find(|m| m.path == path)
    }
}
