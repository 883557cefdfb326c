use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use vg_protocol::{
    DownloadVideoResponse, FrameReader, FrameWriter, Metadata, RpcFrame, RpcMessage, Status,
    UploadVideoRequest,
};
use vg_transfer::{ChunkSink, ChunkSource, TransferError, TransferResult};

use crate::error::{ServerError, ServerResult};

/// How long to wait for the peer to close after the final status.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Server side of one call on one connection.
pub struct RpcCall<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    headers_sent: bool,
}

impl<R, W> RpcCall<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: FrameReader<R>, writer: FrameWriter<W>) -> Self {
        Self {
            reader,
            writer,
            headers_sent: false,
        }
    }

    /// Read the `Open` frame. `None` if the peer hung up without sending one.
    pub async fn read_open(&mut self) -> ServerResult<Option<(String, Metadata)>> {
        match self.reader.read_frame().await? {
            None => Ok(None),
            Some(RpcFrame::Open { method, metadata }) => Ok(Some((method, metadata))),
            Some(other) => Err(Status::invalid_argument(format!(
                "expected Open frame, got {}",
                other.type_name()
            ))
            .into()),
        }
    }

    /// Next request message, or `None` once the client half-closes.
    pub async fn next_message(&mut self) -> ServerResult<Option<RpcMessage>> {
        match self.reader.expect_frame().await? {
            RpcFrame::Message(message) => Ok(Some(message)),
            RpcFrame::HalfClose => Ok(None),
            other => Err(Status::invalid_argument(format!(
                "unexpected {} frame from client",
                other.type_name()
            ))
            .into()),
        }
    }

    /// Read exactly one request message followed by a half-close.
    pub async fn read_request(&mut self) -> ServerResult<RpcMessage> {
        let message = self
            .next_message()
            .await?
            .ok_or_else(|| Status::invalid_argument("missing request message"))?;
        if self.next_message().await?.is_some() {
            return Err(Status::invalid_argument("expected a single request message").into());
        }
        Ok(message)
    }

    pub async fn send_headers(&mut self, metadata: Metadata) -> ServerResult<()> {
        self.writer.write_frame(&RpcFrame::Headers { metadata }).await?;
        self.headers_sent = true;
        Ok(())
    }

    /// Send one response message, preceded by empty headers if none were sent.
    pub async fn send_message(&mut self, message: RpcMessage) -> ServerResult<()> {
        if !self.headers_sent {
            self.send_headers(Metadata::new()).await?;
        }
        self.writer.write_frame(&RpcFrame::Message(message)).await?;
        Ok(())
    }

    /// Write the final status, close our half and wait for the peer to close
    /// theirs.
    pub async fn finish(mut self, status: Status) -> ServerResult<()> {
        self.writer.write_frame(&RpcFrame::Status(status)).await?;
        self.writer.shutdown().await?;

        // Closing with unread input would reset the connection and could
        // discard the status before the client reads it.
        let mut rest = self.reader.into_inner();
        let mut sink = tokio::io::sink();
        let drain = tokio::io::copy(&mut rest, &mut sink);
        let _ = tokio::time::timeout(DRAIN_TIMEOUT, drain).await;
        Ok(())
    }
}

/// Upload chunks pulled from a call.
pub struct UploadStream<'a, R, W>(pub &'a mut RpcCall<R, W>);

#[async_trait]
impl<R, W> ChunkSource for UploadStream<'_, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_chunk(&mut self) -> TransferResult<Option<UploadVideoRequest>> {
        match self.0.next_message().await {
            Ok(None) => Ok(None),
            Ok(Some(RpcMessage::UploadVideoRequest(chunk))) => Ok(Some(chunk)),
            Ok(Some(other)) => Err(TransferError::InvalidArgument(format!(
                "expected UploadVideoRequest, got {}",
                other.type_name()
            ))),
            Err(ServerError::Rejected(status)) => Err(TransferError::InvalidArgument(status.message)),
            Err(e) => Err(TransferError::Transport(e.to_string())),
        }
    }
}

/// Download chunks pushed onto a call.
pub struct DownloadStream<'a, R, W>(pub &'a mut RpcCall<R, W>);

#[async_trait]
impl<R, W> ChunkSink for DownloadStream<'_, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send_chunk(&mut self, chunk: DownloadVideoResponse) -> TransferResult<()> {
        self.0
            .send_message(RpcMessage::DownloadVideoResponse(chunk))
            .await
            .map_err(|e| TransferError::Transport(e.to_string()))
    }
}
