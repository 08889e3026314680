//! Local persistent object store for preload.
//!
//! The import engine talks to storage only through the [`ObjectStore`]
//! capability trait. [`SqliteStore`] is the bundled implementation.
//!
//! # Architecture
//!
//! - Objects are keyed by `(class_name, object_id)`; attributes are stored as
//!   a JSON document alongside typed identity, timestamp and state columns
//! - Relation links are rows of `(owner, key, target)` and are idempotent
//! - Bulk saves run in a single transaction
//! - Blocking SQLite work runs on the tokio blocking pool

mod error;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;
pub use store::ObjectStore;
