use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use vg_protocol::{FrameReader, FrameWriter, RpcCodec, Status};

use crate::call::RpcCall;
use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::ServerResult;
use crate::gateway::serve_gateway;

/// TCP listener for framed RPC calls. One call per connection.
pub struct RpcServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl RpcServer {
    pub fn new(config: ServerConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::from_config(&config));
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_dispatcher(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Bind `bind_addr` and serve until the listener fails.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> ServerResult<()> {
        tracing::info!("videogate RPC listening on {}", listener.local_addr()?);
        let codec = RpcCodec::new(self.config.max_message_size);
        let timeout = self.config.call_timeout();
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(&dispatcher, stream, codec, timeout).await {
                    tracing::debug!(%peer, error = %e, "connection ended with error");
                }
            });
        }
    }
}

async fn handle_connection(
    dispatcher: &Dispatcher,
    stream: TcpStream,
    codec: RpcCodec,
    timeout: Option<std::time::Duration>,
) -> ServerResult<()> {
    stream.set_nodelay(true)?;
    let (read, write) = stream.into_split();
    let mut call = RpcCall::new(FrameReader::new(read, codec), FrameWriter::new(write, codec));

    let (path, metadata) = match call.read_open().await {
        Ok(Some(opened)) => opened,
        Ok(None) => return Ok(()),
        Err(e) => return call.finish(e.to_status()).await,
    };

    let status = match dispatcher.serve_call(&mut call, &path, metadata, timeout).await {
        Ok(()) => Status::ok(),
        Err(e) => e.to_status(),
    };
    call.finish(status).await
}

/// Run the RPC listener and, if configured, the HTTP gateway.
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    config.validate()?;
    let dispatcher = Arc::new(Dispatcher::from_config(&config));
    let rpc_listener = TcpListener::bind(config.bind_addr).await?;

    let gateway = match config.gateway_addr {
        Some(addr) => Some(bind_gateway(addr, Arc::clone(&dispatcher)).await?),
        None => None,
    };

    let server = RpcServer::with_dispatcher(config, dispatcher);
    match gateway {
        Some(gateway) => {
            tokio::try_join!(server.serve_on(rpc_listener), gateway)?;
            Ok(())
        }
        None => server.serve_on(rpc_listener).await,
    }
}

async fn bind_gateway(
    addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
) -> ServerResult<impl std::future::Future<Output = ServerResult<()>>> {
    let listener = TcpListener::bind(addr).await?;
    Ok(serve_gateway(listener, dispatcher))
}
