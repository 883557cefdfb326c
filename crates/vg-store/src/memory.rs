use std::collections::HashMap;
use std::sync::RwLock;

use vg_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// A single table-wide `RwLock` guards the map: lookups share the lock,
/// inserts take it exclusively. There is no per-object locking, so a commit
/// to one id briefly blocks lookups of every other id.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self
            .objects
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(map.get(id).cloned())
    }

    fn put(&self, object: StoredObject) -> StoreResult<Option<StoredObject>> {
        if object.id.is_empty() {
            return Err(StoreError::EmptyObjectId);
        }
        let id = object.id.clone();
        let size = object.size();
        let replaced = {
            let mut map = self
                .objects
                .write()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            map.insert(id.clone(), object)
        };
        tracing::debug!(object_id = %id, size, replaced = replaced.is_some(), "object stored");
        Ok(replaced)
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self
            .objects
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(map.contains_key(id))
    }

    fn len(&self) -> StoreResult<usize> {
        let map = self
            .objects
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(map.len())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or(0);
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vg_types::VideoMetadata;

    fn make_object(id: &str, content: &[u8]) -> StoredObject {
        let metadata = VideoMetadata {
            uploader_id: "user_1".into(),
            uploader_name: "alice".into(),
            upload_timestamp: 1_700_000_000,
            file_name: id.into(),
            file_size: content.len() as u64,
        };
        StoredObject::new(ObjectId::from(id), content.to_vec(), metadata)
    }

    // -----------------------------------------------------------------------
    // Core get/put
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = InMemoryObjectStore::new();
        let obj = make_object("v1", b"hello world");
        assert!(store.put(obj.clone()).unwrap().is_none());

        let read_back = store.get(&ObjectId::from("v1")).unwrap().expect("should exist");
        assert_eq!(read_back, obj);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryObjectStore::new();
        assert!(store.get(&ObjectId::from("ghost")).unwrap().is_none());
        assert!(!store.contains(&ObjectId::from("ghost")).unwrap());
    }

    #[test]
    fn put_replaces_and_returns_previous() {
        let store = InMemoryObjectStore::new();
        store.put(make_object("v1", b"first")).unwrap();
        let replaced = store.put(make_object("v1", b"second")).unwrap().expect("replaced");
        assert_eq!(&replaced.data[..], b"first");

        let current = store.get(&ObjectId::from("v1")).unwrap().unwrap();
        assert_eq!(&current.data[..], b"second");
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn empty_id_rejected() {
        let store = InMemoryObjectStore::new();
        assert_eq!(store.put(make_object("", b"x")), Err(StoreError::EmptyObjectId));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn empty_payload_is_storable() {
        let store = InMemoryObjectStore::new();
        store.put(make_object("empty", b"")).unwrap();
        let obj = store.get(&ObjectId::from("empty")).unwrap().unwrap();
        assert!(obj.is_empty());
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_counts_distinct_ids() {
        let store = InMemoryObjectStore::new();
        assert!(store.is_empty().unwrap());
        store.put(make_object("a", b"12345")).unwrap();
        store.put(make_object("b", b"123456789")).unwrap();
        store.put(make_object("a", b"replaced")).unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        store.put(make_object("shared", b"shared data")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let obj = store.get(&ObjectId::from("shared")).unwrap();
                    assert_eq!(&obj.expect("present").data[..], b"shared data");
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn concurrent_writers_to_one_id_leave_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.put(make_object("race", &[i; 16])).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        assert_eq!(store.len().unwrap(), 1);
        let winner = store.get(&ObjectId::from("race")).unwrap().unwrap();
        // Whole payload from exactly one writer.
        assert!(winner.data.iter().all(|b| *b == winner.data[0]));
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.put(make_object("x", b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("object_count"));
    }
}
