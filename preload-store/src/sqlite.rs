//! SQLite-backed object store.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use preload_types::{Entity, ObjectRef, ObjectState};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{ObjectStore, StorageError, StorageResult};

const SELECT_OBJECT: &str =
    "SELECT class_name, object_id, created_at, updated_at, complete, dirty, data FROM objects";

/// Object store backed by a single SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS objects (
                class_name TEXT NOT NULL,
                object_id TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT,
                complete INTEGER NOT NULL,
                dirty INTEGER NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (class_name, object_id)
            );

            CREATE TABLE IF NOT EXISTS relations (
                owner_class TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                relation_key TEXT NOT NULL,
                target_class TEXT NOT NULL,
                target_id TEXT NOT NULL,
                UNIQUE(owner_class, owner_id, relation_key, target_class, target_id)
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Task("connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

#[async_trait]
impl ObjectStore for SqliteStore {
    async fn contains_class(&self, class_name: &str) -> StorageResult<bool> {
        let class_name = class_name.to_string();
        self.with_conn(move |conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM objects WHERE class_name = ?1 LIMIT 1",
                    params![class_name],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn save_all(&self, entities: Vec<Entity>) -> StorageResult<()> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO objects
                     (class_name, object_id, created_at, updated_at, complete, dirty, data)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?;
                for entity in &entities {
                    let data = serde_json::to_string(&entity.attributes)?;
                    stmt.execute(params![
                        entity.class_name,
                        entity.object_id,
                        entity.created_at.map(format_timestamp),
                        entity.updated_at.map(format_timestamp),
                        entity.state.complete,
                        entity.state.dirty,
                        data,
                    ])?;
                }
            }
            tx.commit()?;
            debug!("Saved {} objects", entities.len());
            Ok(())
        })
        .await
    }

    async fn add_relation(
        &self,
        owner: &ObjectRef,
        key: &str,
        target: &ObjectRef,
    ) -> StorageResult<()> {
        let owner_class = owner.class_name().to_string();
        let owner_id = owner.require_id()?.to_string();
        let target_class = target.class_name().to_string();
        let target_id = target.require_id()?.to_string();
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO relations
                 (owner_class, owner_id, relation_key, target_class, target_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![owner_class, owner_id, key, target_class, target_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn find_objects(
        &self,
        class_name: &str,
        limit: Option<usize>,
    ) -> StorageResult<Vec<Entity>> {
        let class_name = class_name.to_string();
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_OBJECT} WHERE class_name = ?1 ORDER BY object_id LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![class_name, limit], read_row)?;
            let mut entities = Vec::new();
            for row in rows {
                entities.push(row?.into_entity()?);
            }
            Ok(entities)
        })
        .await
    }

    async fn get_object(&self, class_name: &str, object_id: &str) -> StorageResult<Option<Entity>> {
        let class_name = class_name.to_string();
        let object_id = object_id.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("{SELECT_OBJECT} WHERE class_name = ?1 AND object_id = ?2"),
                    params![class_name, object_id],
                    read_row,
                )
                .optional()?;
            row.map(StoredRow::into_entity).transpose()
        })
        .await
    }

    async fn related(&self, owner: &ObjectRef, key: &str) -> StorageResult<Vec<ObjectRef>> {
        let owner_class = owner.class_name().to_string();
        let owner_id = owner.require_id()?.to_string();
        let key = key.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT target_class, target_id FROM relations
                 WHERE owner_class = ?1 AND owner_id = ?2 AND relation_key = ?3
                 ORDER BY target_class, target_id",
            )?;
            let rows = stmt.query_map(params![owner_class, owner_id, key], |row| {
                Ok(ObjectRef::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
        .await
    }
}

struct StoredRow {
    class_name: String,
    object_id: String,
    created_at: Option<String>,
    updated_at: Option<String>,
    complete: bool,
    dirty: bool,
    data: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        class_name: row.get(0)?,
        object_id: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        complete: row.get(4)?,
        dirty: row.get(5)?,
        data: row.get(6)?,
    })
}

impl StoredRow {
    fn into_entity(self) -> StorageResult<Entity> {
        let attributes: BTreeMap<_, _> = serde_json::from_str(&self.data)?;
        Ok(Entity {
            created_at: self.created_at.as_deref().map(parse_timestamp).transpose()?,
            updated_at: self.updated_at.as_deref().map(parse_timestamp).transpose()?,
            class_name: self.class_name,
            object_id: self.object_id,
            attributes,
            state: ObjectState {
                complete: self.complete,
                dirty: self.dirty,
            },
        })
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("invalid timestamp {s:?}: {e}")))
}
