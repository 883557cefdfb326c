use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;
use vg_protocol::{DownloadVideoResponse, UploadVideoRequest};

use crate::error::{TransferError, TransferResult};

/// Pull side of a client-streamed upload.
#[async_trait]
pub trait ChunkSource: Send {
    /// The next chunk, or `Ok(None)` once the caller has closed its half of
    /// the stream.
    async fn next_chunk(&mut self) -> TransferResult<Option<UploadVideoRequest>>;
}

/// Push side of a server-streamed download.
#[async_trait]
pub trait ChunkSink: Send {
    async fn send_chunk(&mut self, chunk: DownloadVideoResponse) -> TransferResult<()>;
}

#[async_trait]
impl ChunkSource for VecDeque<UploadVideoRequest> {
    async fn next_chunk(&mut self) -> TransferResult<Option<UploadVideoRequest>> {
        Ok(self.pop_front())
    }
}

#[async_trait]
impl ChunkSource for mpsc::Receiver<UploadVideoRequest> {
    async fn next_chunk(&mut self) -> TransferResult<Option<UploadVideoRequest>> {
        Ok(self.recv().await)
    }
}

#[async_trait]
impl ChunkSink for Vec<DownloadVideoResponse> {
    async fn send_chunk(&mut self, chunk: DownloadVideoResponse) -> TransferResult<()> {
        self.push(chunk);
        Ok(())
    }
}

#[async_trait]
impl ChunkSink for mpsc::Sender<DownloadVideoResponse> {
    async fn send_chunk(&mut self, chunk: DownloadVideoResponse) -> TransferResult<()> {
        self.send(chunk)
            .await
            .map_err(|_| TransferError::Transport("download receiver dropped".into()))
    }
}
