//! Shared fixtures for import tests.

#![allow(dead_code)]

use async_trait::async_trait;
use preload_store::{ObjectStore, SqliteStore, StorageError, StorageResult};
use preload_types::{Entity, ObjectRef};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Wraps a store and records every write it is asked to perform.
pub struct RecordingStore {
    inner: SqliteStore,
    saved_classes: Mutex<Vec<String>>,
    relation_writes: Mutex<Vec<(ObjectRef, String, ObjectRef)>>,
    fail_saves_for: Option<String>,
    panic_on_class: Option<String>,
    panic_on_relation_key: Option<String>,
    pub existence_checks: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            saved_classes: Mutex::new(Vec::new()),
            relation_writes: Mutex::new(Vec::new()),
            fail_saves_for: None,
            panic_on_class: None,
            panic_on_relation_key: None,
            existence_checks: AtomicUsize::new(0),
        }
    }

    /// Makes `save_all` fail for batches of the given class.
    pub fn failing_saves_for(class_name: &str) -> Self {
        Self {
            fail_saves_for: Some(class_name.to_string()),
            ..Self::new()
        }
    }

    /// Makes the existence check panic for the given class.
    pub fn panicking_on_class(class_name: &str) -> Self {
        Self {
            panic_on_class: Some(class_name.to_string()),
            ..Self::new()
        }
    }

    /// Makes `add_relation` panic for the given relation key.
    pub fn panicking_on_relation_key(key: &str) -> Self {
        Self {
            panic_on_relation_key: Some(key.to_string()),
            ..Self::new()
        }
    }

    pub fn saved_classes(&self) -> Vec<String> {
        self.saved_classes.lock().unwrap().clone()
    }

    pub fn relation_writes(&self) -> Vec<(ObjectRef, String, ObjectRef)> {
        self.relation_writes.lock().unwrap().clone()
    }

    /// Seeds objects without recording them as writes.
    pub async fn seed(&self, entities: Vec<Entity>) {
        self.inner.save_all(entities).await.unwrap();
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn contains_class(&self, class_name: &str) -> StorageResult<bool> {
        self.existence_checks.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_class.as_deref() == Some(class_name) {
            panic!("existence check exploded for {class_name}");
        }
        self.inner.contains_class(class_name).await
    }

    async fn save_all(&self, entities: Vec<Entity>) -> StorageResult<()> {
        if let Some(first) = entities.first() {
            if self.fail_saves_for.as_deref() == Some(first.class_name.as_str()) {
                return Err(StorageError::InvalidData("disk full".to_string()));
            }
            self.saved_classes.lock().unwrap().push(first.class_name.clone());
        }
        self.inner.save_all(entities).await
    }

    async fn add_relation(
        &self,
        owner: &ObjectRef,
        key: &str,
        target: &ObjectRef,
    ) -> StorageResult<()> {
        if self.panic_on_relation_key.as_deref() == Some(key) {
            panic!("relation write exploded for {key}");
        }
        self.relation_writes
            .lock()
            .unwrap()
            .push((owner.clone(), key.to_string(), target.clone()));
        self.inner.add_relation(owner, key, target).await
    }

    async fn find_objects(
        &self,
        class_name: &str,
        limit: Option<usize>,
    ) -> StorageResult<Vec<Entity>> {
        self.inner.find_objects(class_name, limit).await
    }

    async fn get_object(&self, class_name: &str, object_id: &str) -> StorageResult<Option<Entity>> {
        self.inner.get_object(class_name, object_id).await
    }

    async fn related(&self, owner: &ObjectRef, key: &str) -> StorageResult<Vec<ObjectRef>> {
        self.inner.related(owner, key).await
    }
}

/// Routes `tracing` output through the test harness so traced runs show up
/// with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn recording_store() -> Arc<RecordingStore> {
    Arc::new(RecordingStore::new())
}

pub fn player(id: &str) -> Entity {
    Entity::new("Player", id)
}
