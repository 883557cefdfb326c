//! Chunked video transfer for videogate.
//!
//! Uploads arrive as a client stream of chunks and are buffered until the
//! stream ends cleanly, at which point the whole payload is committed to the
//! [`ObjectStore`](vg_store::ObjectStore) in one step. Downloads slice a
//! committed payload into fixed-size chunks.
//!
//! # State Machines
//!
//! - [`UploadSession`] -- `AwaitingFirstChunk -> ReceivingChunks -> Finalizing -> Committed | Aborted`
//! - [`Rechunker`] -- yields download chunks `1..=N`, metadata on the first only
//!
//! Both are synchronous. The async drivers [`receive_upload`] and
//! [`send_download`] pull from a [`ChunkSource`] and push into a
//! [`ChunkSink`].

pub mod download;
pub mod error;
pub mod stream;
pub mod upload;

pub use download::{prepare_download, send_download, DownloadSummary, Rechunker, DEFAULT_CHUNK_SIZE};
pub use error::{TransferError, TransferResult};
pub use stream::{ChunkSink, ChunkSource};
pub use upload::{receive_upload, resolve_owner, UploadSession, UploadState};
