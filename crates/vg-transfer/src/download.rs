use bytes::Bytes;
use vg_protocol::{CallContext, DownloadVideoRequest, DownloadVideoResponse};
use vg_store::{ObjectStore, StoredObject};
use vg_types::{ObjectId, VideoMetadata};

use crate::error::{TransferError, TransferResult};
use crate::stream::ChunkSink;

/// Download slice size when none is configured (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Splits a committed payload into download chunks.
///
/// Sequences run from 1 to N. Only the first chunk carries metadata, and a
/// final short chunk holds the remainder.
#[derive(Debug)]
pub struct Rechunker {
    video_id: String,
    data: Bytes,
    chunk_size: usize,
    offset: usize,
    sequence: i64,
    metadata: Option<VideoMetadata>,
}

impl Rechunker {
    /// A `chunk_size` of zero is treated as one byte.
    pub fn new(object: StoredObject, chunk_size: usize) -> Self {
        Self {
            video_id: object.id.into_string(),
            data: object.data,
            chunk_size: chunk_size.max(1),
            offset: 0,
            sequence: 0,
            metadata: Some(object.metadata),
        }
    }

    /// Number of chunks this payload splits into.
    pub fn chunk_count(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size)
    }

    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }
}

impl Iterator for Rechunker {
    type Item = DownloadVideoResponse;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        let end = (self.offset + self.chunk_size).min(self.data.len());
        let data = self.data.slice(self.offset..end);
        self.offset = end;
        self.sequence += 1;
        Some(DownloadVideoResponse {
            video_id: self.video_id.clone(),
            data: data.to_vec(),
            sequence: self.sequence,
            metadata: self.metadata.take(),
        })
    }
}

/// Look the requested object up and plan its chunks.
pub fn prepare_download(
    store: &dyn ObjectStore,
    request: &DownloadVideoRequest,
    chunk_size: usize,
) -> TransferResult<Rechunker> {
    let id = ObjectId::new(request.video_id.as_str());
    let object = store
        .get(&id)?
        .ok_or_else(|| TransferError::NotFound("video not found".into()))?;
    if object.is_empty() {
        return Err(TransferError::FailedPrecondition(
            "no download source available for this video".into(),
        ));
    }
    Ok(Rechunker::new(object, chunk_size))
}

/// What a finished download sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadSummary {
    pub chunks: u64,
    pub total_bytes: u64,
}

/// Stream an object to `sink`, stopping at the first send failure.
pub async fn send_download<K>(
    ctx: &CallContext,
    store: &dyn ObjectStore,
    request: &DownloadVideoRequest,
    chunk_size: usize,
    sink: &mut K,
) -> TransferResult<DownloadSummary>
where
    K: ChunkSink + ?Sized,
{
    let chunks = prepare_download(store, request, chunk_size)?;
    tracing::info!(
        call_id = %ctx.call_id(),
        video_id = %request.video_id,
        total_bytes = chunks.total_bytes(),
        chunk_count = chunks.chunk_count(),
        "video_download_started"
    );

    let mut summary = DownloadSummary { chunks: 0, total_bytes: 0 };
    for chunk in chunks {
        let sequence = chunk.sequence;
        let len = chunk.data.len() as u64;
        sink.send_chunk(chunk).await?;
        summary.chunks += 1;
        summary.total_bytes += len;
        tracing::debug!(call_id = %ctx.call_id(), sequence, chunk_bytes = len, "chunk_sent");
    }

    tracing::info!(
        call_id = %ctx.call_id(),
        video_id = %request.video_id,
        chunks = summary.chunks,
        total_bytes = summary.total_bytes,
        "video_download_completed"
    );
    Ok(summary)
}
