//! videogate server.
//!
//! Accepts framed RPC calls over TCP, gates them through the bearer-token
//! [`AuthInterceptor`], and dispatches them to the auth and media services.
//! An optional axum gateway exposes the auth methods as JSON over HTTP.

pub mod call;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod interceptor;
pub mod server;
pub mod services;

pub use config::{ServerConfig, DOWNLOAD_FRAME_HEADROOM};
pub use dispatch::Dispatcher;
pub use error::{ServerError, ServerResult};
pub use gateway::build_router;
pub use interceptor::{AuthInterceptor, Interceptor, PUBLIC_METHODS};
pub use server::{run, RpcServer};
pub use services::{AuthService, MediaService};
