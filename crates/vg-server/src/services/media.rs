use std::sync::Arc;

use vg_protocol::{CallContext, DownloadVideoRequest, UploadVideoResponse};
use vg_store::ObjectStore;
use vg_transfer::{receive_upload, send_download, ChunkSink, ChunkSource, DownloadSummary};

use crate::error::ServerResult;

/// UploadVideo and DownloadVideo.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn ObjectStore>,
    download_chunk_size: usize,
}

impl MediaService {
    pub fn new(store: Arc<dyn ObjectStore>, download_chunk_size: usize) -> Self {
        Self {
            store,
            download_chunk_size,
        }
    }

    pub async fn upload_video<S>(&self, ctx: &CallContext, source: &mut S) -> ServerResult<UploadVideoResponse>
    where
        S: ChunkSource + ?Sized,
    {
        Ok(receive_upload(ctx, source, self.store.as_ref()).await?)
    }

    pub async fn download_video<K>(
        &self,
        ctx: &CallContext,
        request: &DownloadVideoRequest,
        sink: &mut K,
    ) -> ServerResult<DownloadSummary>
    where
        K: ChunkSink + ?Sized,
    {
        Ok(send_download(ctx, self.store.as_ref(), request, self.download_chunk_size, sink).await?)
    }
}
