use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::{RpcCodec, LENGTH_PREFIX};
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::RpcFrame;

/// Reads length-prefixed frames from a byte stream.
pub struct FrameReader<R> {
    inner: R,
    codec: RpcCodec,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, codec: RpcCodec) -> Self {
        Self {
            inner,
            codec,
            buf: BytesMut::new(),
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed the stream between frames.
    /// A close in the middle of a frame is a framing error.
    pub async fn read_frame(&mut self) -> ProtocolResult<Option<RpcFrame>> {
        let mut prefix = [0u8; LENGTH_PREFIX];
        match self.inner.read_exact(&mut prefix).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = self.codec.frame_len(prefix)?;

        self.buf.clear();
        self.buf.extend_from_slice(&prefix);
        self.buf.resize(LENGTH_PREFIX + len, 0);
        self.inner
            .read_exact(&mut self.buf[LENGTH_PREFIX..])
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => {
                    ProtocolError::FramingError("stream closed mid-frame".into())
                }
                _ => ProtocolError::Io(e),
            })?;

        let (frame, _) = self.codec.decode(&self.buf)?;
        tracing::trace!(frame = frame.type_name(), len, "frame read");
        Ok(Some(frame))
    }

    /// Read the next frame, treating end-of-stream as an error.
    pub async fn expect_frame(&mut self) -> ProtocolResult<RpcFrame> {
        self.read_frame()
            .await?
            .ok_or_else(|| ProtocolError::FramingError("stream closed before frame".into()))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Writes length-prefixed frames to a byte stream.
pub struct FrameWriter<W> {
    inner: W,
    codec: RpcCodec,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W, codec: RpcCodec) -> Self {
        Self { inner, codec }
    }

    /// Encode and write one frame, flushing it to the peer.
    pub async fn write_frame(&mut self, frame: &RpcFrame) -> ProtocolResult<()> {
        let bytes = self.codec.encode(frame)?;
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        tracing::trace!(frame = frame.type_name(), len = bytes.len(), "frame written");
        Ok(())
    }

    /// Shut down the write half.
    pub async fn shutdown(&mut self) -> ProtocolResult<()> {
        self.inner.shutdown().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
