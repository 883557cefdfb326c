//! Method handlers. Each service owns the state its methods touch.

pub mod auth;
pub mod media;

pub use auth::AuthService;
pub use media::MediaService;
