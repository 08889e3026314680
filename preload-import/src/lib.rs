//! Bulk import of exported JSON records into a local object store.
//!
//! Exports are grouped into named batches. A batch named after a class holds
//! that class's objects; a batch named `_Join:<relationKey>:<Owner>:<Target>`
//! holds relation edges between objects that were loaded by entity batches.
//!
//! # Components
//!
//! - **Decoder** ([`decode`]): JSON record -> [`preload_types::Entity`],
//!   resolving `__type` envelopes, `_p_` pointer shorthand and `_acl`
//! - **Partitioner** ([`partition`]): entity vs. relation batches, relation
//!   batch name parsing
//! - **Class importer** ([`ClassImporter`]): idempotent, all-or-nothing import
//!   of one class
//! - **Relation importer** ([`RelationImporter`]): independent per-edge import
//! - **Orchestrator** ([`Orchestrator`]): concurrent fan-out, skip-aware
//!   relation filtering, merged [`Outcome`]
//!
//! # Example
//!
//! ```no_run
//! use preload_import::{ImportConfig, Orchestrator};
//! use preload_store::SqliteStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open_in_memory()?);
//! let orchestrator = Orchestrator::with_config(store, ImportConfig::default().with_trace(true));
//! let outcome = orchestrator.load_directory("seed-data").await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

mod class_importer;
mod config;
pub mod decode;
mod error;
mod loader;
mod orchestrator;
mod outcome;
pub mod partition;
mod relation_importer;

pub use class_importer::{ClassImporter, ClassOutcome};
pub use config::{ImportConfig, DEFAULT_JOIN_PREFIX, DEFAULT_RESULTS_KEY};
pub use decode::decode_record;
pub use error::{DecodeError, ImportError, ImportResult};
pub use orchestrator::Orchestrator;
pub use outcome::{Failure, ImportUnit, Imported, Outcome, Skipped};
pub use partition::{parse_relation_key, ImportBatch, RawRecord, RelationSpec};
pub use relation_importer::{RelationEdge, RelationImporter, RelationOutcome};
