use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use vg_crypto::SigningSecret;
use vg_protocol::MAX_MESSAGE_SIZE;
use vg_transfer::DEFAULT_CHUNK_SIZE;

use crate::error::{ServerError, ServerResult};

/// Room a download frame needs beyond its chunk bytes: the video id (twice,
/// once as the file name), the uploader identity and the bincode framing.
pub const DOWNLOAD_FRAME_HEADROOM: usize = 64 * 1024;

/// Server settings, loadable from TOML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// HTTP gateway listener. `None` disables the gateway.
    pub gateway_addr: Option<SocketAddr>,
    /// HS256 signing secret. Generated at startup when unset.
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: u64,
    pub download_chunk_size: usize,
    pub max_message_size: usize,
    /// Per-call deadline. Calls run unbounded when unset.
    pub call_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 50051)),
            gateway_addr: Some(SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))),
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
            download_chunk_size: DEFAULT_CHUNK_SIZE,
            max_message_size: MAX_MESSAGE_SIZE,
            call_timeout_secs: None,
        }
    }
}

impl ServerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.download_chunk_size == 0 {
            return Err(ServerError::Config("download_chunk_size must be positive".into()));
        }
        if self.download_chunk_size.saturating_add(DOWNLOAD_FRAME_HEADROOM) > self.max_message_size {
            return Err(ServerError::Config(format!(
                "download_chunk_size must leave {DOWNLOAD_FRAME_HEADROOM} bytes of headroom below max_message_size"
            )));
        }
        if self.token_ttl_secs == 0 {
            return Err(ServerError::Config("token_ttl_secs must be positive".into()));
        }
        if ttl_duration(self.token_ttl_secs).is_none() {
            return Err(ServerError::Config("token_ttl_secs is too large".into()));
        }
        if matches!(self.jwt_secret.as_deref(), Some("")) {
            return Err(ServerError::Config("jwt_secret must not be empty".into()));
        }
        Ok(())
    }

    /// The configured signing secret, or a fresh random one.
    pub fn signing_secret(&self) -> SigningSecret {
        match &self.jwt_secret {
            Some(secret) => SigningSecret::new(secret.as_bytes()),
            None => {
                tracing::warn!("no jwt_secret configured; generated a random one, tokens will not survive a restart");
                SigningSecret::generate()
            }
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        ttl_duration(self.token_ttl_secs).unwrap_or(vg_auth::DEFAULT_TOKEN_TTL)
    }

    pub fn call_timeout(&self) -> Option<std::time::Duration> {
        self.call_timeout_secs.map(std::time::Duration::from_secs)
    }
}

fn ttl_duration(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}
