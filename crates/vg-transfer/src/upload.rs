use std::fmt;

use bytes::BytesMut;
use vg_protocol::{keys, CallContext, UploadVideoRequest, UploadVideoResponse};
use vg_store::{ObjectStore, StoredObject};
use vg_types::{Identity, ObjectId, TypeError, UserId, VideoMetadata};

use crate::error::{TransferError, TransferResult};
use crate::stream::ChunkSource;

/// Lifecycle of one upload stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadState {
    AwaitingFirstChunk,
    ReceivingChunks,
    Finalizing,
    Committed,
    Aborted,
}

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingFirstChunk => "awaiting first chunk",
            Self::ReceivingChunks => "receiving chunks",
            Self::Finalizing => "finalizing",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffers the chunks of a single upload until the stream ends.
///
/// The session never touches the store. [`UploadSession::finish`] produces
/// the object to commit, and the caller reports the outcome with
/// [`UploadSession::mark_committed`] or [`UploadSession::abort`].
pub struct UploadSession {
    state: UploadState,
    object_id: Option<ObjectId>,
    buffer: BytesMut,
    chunks: u64,
    last_sequence: Option<i64>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            state: UploadState::AwaitingFirstChunk,
            object_id: None,
            buffer: BytesMut::new(),
            chunks: 0,
            last_sequence: None,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// The id declared by the first chunk.
    pub fn object_id(&self) -> Option<&ObjectId> {
        self.object_id.as_ref()
    }

    /// Bytes buffered so far.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Sequence number of the most recent chunk, as labelled by the caller.
    pub fn last_sequence(&self) -> Option<i64> {
        self.last_sequence
    }

    /// Append one chunk.
    ///
    /// The first chunk fixes the object id. Any error aborts the session.
    pub fn accept(&mut self, chunk: UploadVideoRequest) -> TransferResult<()> {
        match self.state {
            UploadState::AwaitingFirstChunk => {
                let id = match ObjectId::parse(&chunk.video_id) {
                    Ok(id) => id,
                    Err(TypeError::ObjectIdTooLong { .. }) => {
                        return Err(self.reject("video ID is too long"))
                    }
                    Err(_) => return Err(self.reject("video ID is required")),
                };
                self.object_id = Some(id);
                self.state = UploadState::ReceivingChunks;
            }
            UploadState::ReceivingChunks => {
                let matches = self
                    .object_id
                    .as_ref()
                    .is_some_and(|id| id.as_str() == chunk.video_id);
                if !matches {
                    return Err(self.reject("inconsistent video ID"));
                }
            }
            other => return Err(TransferError::SessionClosed(other.as_str())),
        }

        self.buffer.extend_from_slice(&chunk.data);
        self.chunks += 1;
        self.last_sequence = Some(chunk.sequence);
        Ok(())
    }

    /// Close the stream and build the object to commit.
    ///
    /// Fails with `InvalidArgument` if no chunk was ever accepted.
    pub fn finish(&mut self, owner: &Identity, upload_timestamp: i64) -> TransferResult<StoredObject> {
        match self.state {
            UploadState::ReceivingChunks => {}
            UploadState::AwaitingFirstChunk => return Err(self.reject("no video ID provided")),
            other => return Err(TransferError::SessionClosed(other.as_str())),
        }
        let id = match self.object_id.clone() {
            Some(id) => id,
            None => return Err(self.reject("no video ID provided")),
        };

        self.state = UploadState::Finalizing;
        let data = std::mem::take(&mut self.buffer).freeze();
        let metadata = VideoMetadata::for_upload(owner, &id, data.len() as u64, upload_timestamp);
        Ok(StoredObject::new(id, data, metadata))
    }

    /// Record that the object returned by `finish` is now in the store.
    pub fn mark_committed(&mut self) {
        if self.state == UploadState::Finalizing {
            self.state = UploadState::Committed;
        }
    }

    /// Drop everything buffered. No-op once committed.
    pub fn abort(&mut self) {
        if self.state != UploadState::Committed {
            self.state = UploadState::Aborted;
            self.buffer = BytesMut::new();
        }
    }

    fn reject(&mut self, message: &str) -> TransferError {
        self.abort();
        TransferError::InvalidArgument(message.to_string())
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSession")
            .field("state", &self.state)
            .field("object_id", &self.object_id)
            .field("buffered", &self.buffer.len())
            .field("chunks", &self.chunks)
            .finish()
    }
}

/// Decide who owns an upload.
///
/// A verified identity always wins. Without one, the `user-id` and
/// `user-name` headers are used, each falling back to the unknown sentinel
/// on its own.
pub fn resolve_owner(ctx: &CallContext) -> Identity {
    if let Some(identity) = ctx.identity() {
        return identity.clone();
    }
    let metadata = ctx.metadata();
    let user_id = metadata
        .get(keys::USER_ID)
        .filter(|v| !v.is_empty())
        .unwrap_or(Identity::UNKNOWN_ID);
    let username = metadata
        .get(keys::USER_NAME)
        .filter(|v| !v.is_empty())
        .unwrap_or(Identity::UNKNOWN_NAME);
    Identity::new(UserId::from_raw(user_id), username)
}

/// Drive an upload to completion: pull every chunk, then commit.
///
/// Nothing reaches the store unless the source ends cleanly and every chunk
/// was accepted.
pub async fn receive_upload<S>(
    ctx: &CallContext,
    source: &mut S,
    store: &dyn ObjectStore,
) -> TransferResult<UploadVideoResponse>
where
    S: ChunkSource + ?Sized,
{
    let mut session = UploadSession::new();

    loop {
        let chunk = match source.next_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                session.abort();
                tracing::warn!(call_id = %ctx.call_id(), error = %e, "upload stream failed");
                return Err(e);
            }
        };

        let first = session.state() == UploadState::AwaitingFirstChunk;
        let sequence = chunk.sequence;
        let len = chunk.data.len();
        session.accept(chunk)?;

        if first {
            if let Some(id) = session.object_id() {
                tracing::info!(call_id = %ctx.call_id(), video_id = %id, "video_upload_started");
            }
        }
        tracing::debug!(
            call_id = %ctx.call_id(),
            sequence,
            chunk_bytes = len,
            total_bytes = session.buffered(),
            "chunk_received"
        );
    }

    let owner = resolve_owner(ctx);
    let object = session.finish(&owner, chrono::Utc::now().timestamp())?;
    let response = UploadVideoResponse {
        video_id: object.id.to_string(),
        total_bytes: object.size(),
        metadata: object.metadata.clone(),
    };

    if let Err(e) = store.put(object) {
        session.abort();
        return Err(e.into());
    }
    session.mark_committed();

    tracing::info!(
        call_id = %ctx.call_id(),
        video_id = %response.video_id,
        total_bytes = response.total_bytes,
        chunks = session.chunks(),
        owner = %owner,
        "video_upload_completed"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use vg_protocol::{methods, Metadata, MethodDescriptor};
    use vg_store::InMemoryObjectStore;

    use super::*;

    fn chunk(id: &str, data: &[u8], sequence: i64) -> UploadVideoRequest {
        UploadVideoRequest {
            video_id: id.into(),
            data: data.to_vec(),
            sequence,
        }
    }

    fn ctx(metadata: Metadata) -> CallContext {
        let method = MethodDescriptor::lookup(methods::UPLOAD_VIDEO).unwrap();
        CallContext::new(method, metadata)
    }

    fn alice() -> Identity {
        Identity::new(UserId::sequential(1), "alice")
    }

    #[test]
    fn accept_then_finish() {
        let mut session = UploadSession::new();
        assert_eq!(session.state(), UploadState::AwaitingFirstChunk);

        session.accept(chunk("v1", b"abc", 1)).unwrap();
        assert_eq!(session.state(), UploadState::ReceivingChunks);
        session.accept(chunk("v1", b"def", 2)).unwrap();
        assert_eq!(session.buffered(), 6);
        assert_eq!(session.last_sequence(), Some(2));

        let object = session.finish(&alice(), 42).unwrap();
        assert_eq!(session.state(), UploadState::Finalizing);
        assert_eq!(&object.data[..], b"abcdef");
        assert_eq!(object.metadata.file_size, 6);
        assert_eq!(object.metadata.upload_timestamp, 42);
        assert_eq!(object.metadata.uploader_name, "alice");

        session.mark_committed();
        assert!(session.state().is_terminal());
    }

    #[test]
    fn empty_first_id_rejected() {
        let mut session = UploadSession::new();
        let err = session.accept(chunk("", b"abc", 1)).unwrap_err();
        assert!(matches!(err, TransferError::InvalidArgument(ref m) if m == "video ID is required"));
        assert_eq!(session.state(), UploadState::Aborted);
    }

    #[test]
    fn overlong_first_id_rejected() {
        let mut session = UploadSession::new();
        let id = "v".repeat(vg_types::MAX_OBJECT_ID_LEN + 1);
        let err = session.accept(chunk(&id, b"abc", 1)).unwrap_err();
        assert!(matches!(err, TransferError::InvalidArgument(ref m) if m == "video ID is too long"));
        assert_eq!(session.state(), UploadState::Aborted);
    }

    #[test]
    fn changed_id_aborts() {
        let mut session = UploadSession::new();
        session.accept(chunk("v1", b"abc", 1)).unwrap();
        let err = session.accept(chunk("v2", b"def", 2)).unwrap_err();
        assert!(matches!(err, TransferError::InvalidArgument(ref m) if m == "inconsistent video ID"));
        assert_eq!(session.state(), UploadState::Aborted);
        assert_eq!(session.buffered(), 0);
        assert!(matches!(
            session.accept(chunk("v1", b"x", 3)),
            Err(TransferError::SessionClosed(_))
        ));
    }

    #[test]
    fn finish_without_chunks() {
        let mut session = UploadSession::new();
        let err = session.finish(&alice(), 0).unwrap_err();
        assert!(matches!(err, TransferError::InvalidArgument(ref m) if m == "no video ID provided"));
    }

    #[test]
    fn sequence_numbers_do_not_reorder() {
        let mut session = UploadSession::new();
        session.accept(chunk("v1", b"second", 2)).unwrap();
        session.accept(chunk("v1", b"first", 1)).unwrap();
        let object = session.finish(&alice(), 0).unwrap();
        assert_eq!(&object.data[..], b"secondfirst");
    }

    #[test]
    fn owner_prefers_verified_identity() {
        let md = Metadata::new().with("user-id", "user_9").with("user-name", "mallory");
        let ctx = ctx(md).authenticated(alice());
        assert_eq!(resolve_owner(&ctx), alice());
    }

    #[test]
    fn owner_falls_back_to_hints_then_sentinel() {
        let md = Metadata::new().with("user-id", "user_9");
        let owner = resolve_owner(&ctx(md));
        assert_eq!(owner.user_id.as_str(), "user_9");
        assert_eq!(owner.username, Identity::UNKNOWN_NAME);

        let owner = resolve_owner(&ctx(Metadata::new()));
        assert_eq!(owner, Identity::unknown());
    }

    #[tokio::test]
    async fn receive_upload_commits_on_clean_end() {
        let store = InMemoryObjectStore::new();
        let first: Vec<u8> = (0..500_000u32).map(|i| i as u8).collect();
        let second: Vec<u8> = (500_000..900_000u32).map(|i| i as u8).collect();
        let mut source: VecDeque<_> =
            vec![chunk("v1", &first, 1), chunk("v1", &second, 2)].into();

        let ctx = ctx(Metadata::new()).authenticated(alice());
        let response = receive_upload(&ctx, &mut source, &store).await.unwrap();
        assert_eq!(response.video_id, "v1");
        assert_eq!(response.total_bytes, 900_000);
        assert_eq!(response.metadata.uploader_id, "user_1");

        let stored = store.get(&ObjectId::from("v1")).unwrap().unwrap();
        assert_eq!(stored.size(), 900_000);
        assert_eq!(&stored.data[..500_000], &first[..]);
    }

    #[tokio::test]
    async fn rejected_stream_leaves_store_untouched() {
        let store = InMemoryObjectStore::new();
        let mut source: VecDeque<_> = vec![chunk("v1", b"abc", 1), chunk("v2", b"def", 2)].into();
        let err = receive_upload(&ctx(Metadata::new()), &mut source, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidArgument(_)));
        assert!(store.is_empty().unwrap());
    }

    struct FailingSource {
        sent: bool,
    }

    #[async_trait]
    impl ChunkSource for FailingSource {
        async fn next_chunk(&mut self) -> TransferResult<Option<UploadVideoRequest>> {
            if self.sent {
                return Err(TransferError::Transport("connection reset".into()));
            }
            self.sent = true;
            Ok(Some(chunk("v1", b"abc", 1)))
        }
    }

    #[tokio::test]
    async fn transport_failure_aborts() {
        let store = InMemoryObjectStore::new();
        let mut source = FailingSource { sent: false };
        let err = receive_upload(&ctx(Metadata::new()), &mut source, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Transport(_)));
        assert!(!store.contains(&ObjectId::from("v1")).unwrap());
    }

    #[tokio::test]
    async fn reupload_replaces_previous_object() {
        let store = InMemoryObjectStore::new();
        let ctx = ctx(Metadata::new());
        let mut source: VecDeque<_> = vec![chunk("v1", b"old", 1)].into();
        receive_upload(&ctx, &mut source, &store).await.unwrap();
        let mut source: VecDeque<_> = vec![chunk("v1", b"newer", 1)].into();
        receive_upload(&ctx, &mut source, &store).await.unwrap();

        let stored = store.get(&ObjectId::from("v1")).unwrap().unwrap();
        assert_eq!(&stored.data[..], b"newer");
        assert_eq!(store.len().unwrap(), 1);
    }
}
