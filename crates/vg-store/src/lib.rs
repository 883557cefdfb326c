//! Video object storage for videogate.
//!
//! Objects are keyed by a caller-chosen [`ObjectId`](vg_types::ObjectId) and
//! carry the raw payload plus the [`VideoMetadata`](vg_types::VideoMetadata)
//! recorded at commit time.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap` behind a single `RwLock`
//!
//! # Design Rules
//!
//! 1. A payload is immutable once committed; replacement swaps the whole object.
//! 2. Lookups may run concurrently with each other.
//! 3. Inserts and replacements are exclusive with every other access.
//! 4. Locks are held only around the map operation, never across I/O.
//! 5. Nothing is persisted; the store lives as long as the process.

pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::StoredObject;
pub use traits::ObjectStore;
