use async_trait::async_trait;
use preload_types::{Entity, ObjectRef};

use crate::StorageResult;

/// What the import engine needs from a local object store.
///
/// Implementations must be safe to share across tasks: class imports and
/// relation imports call into the same store concurrently.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns true if at least one object of `class_name` is stored.
    ///
    /// This is the idempotency check for class imports. It looks at a single
    /// object and ignores access control. A store that cannot answer cheaply
    /// may keep a ledger of imported classes instead.
    async fn contains_class(&self, class_name: &str) -> StorageResult<bool>;

    /// Persists all entities as one atomic operation.
    ///
    /// Either every entity is stored or none is. Entities keep their
    /// [`preload_types::ObjectState`].
    async fn save_all(&self, entities: Vec<Entity>) -> StorageResult<()>;

    /// Records that `owner` relates to `target` under `key`.
    ///
    /// Both references must carry an object id. Adding the same link twice
    /// is not an error.
    async fn add_relation(&self, owner: &ObjectRef, key: &str, target: &ObjectRef)
        -> StorageResult<()>;

    /// Returns stored objects of a class, ordered by object id.
    async fn find_objects(&self, class_name: &str, limit: Option<usize>)
        -> StorageResult<Vec<Entity>>;

    /// Returns one object by identity.
    async fn get_object(&self, class_name: &str, object_id: &str)
        -> StorageResult<Option<Entity>>;

    /// Returns the targets linked from `owner` under `key`.
    async fn related(&self, owner: &ObjectRef, key: &str) -> StorageResult<Vec<ObjectRef>>;
}
