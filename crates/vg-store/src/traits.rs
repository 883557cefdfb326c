use vg_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Keyed video object store.
///
/// All implementations must satisfy these invariants:
/// - `get` never observes a partially written object.
/// - `put` replaces any existing object under the same id atomically.
/// - Concurrent `put`s to one id race; the last writer wins.
/// - The locking strategy stays internal to the implementation.
pub trait ObjectStore: Send + Sync {
    /// Look an object up by id.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn get(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Insert an object, replacing any previous object with the same id.
    ///
    /// Returns the replaced object, if there was one.
    fn put(&self, object: StoredObject) -> StoreResult<Option<StoredObject>>;

    /// Check whether an object exists.
    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Number of stored objects.
    fn len(&self) -> StoreResult<usize>;

    /// Returns `true` if the store holds no objects.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
