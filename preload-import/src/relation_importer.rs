//! Relation importer: links previously loaded objects, one edge at a time.

use futures::future::join_all;
use preload_store::ObjectStore;
use preload_types::ObjectRef;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::partition::{RawRecord, RelationSpec};
use crate::{ImportConfig, ImportError, ImportResult};

/// Field naming the owning object's id.
pub const OWNING_ID_KEY: &str = "owningId";

/// Field naming the related object's id.
pub const RELATED_ID_KEY: &str = "relatedId";

/// One edge of a relation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEdge {
    pub owning_id: String,
    pub related_id: String,
}

impl RelationEdge {
    /// Reads an edge record. Both ids must be non-empty strings.
    pub fn from_record(record: &RawRecord) -> ImportResult<Self> {
        let field = |name: &'static str| {
            record
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or(ImportError::MissingRelationField { field: name })
        };
        Ok(Self {
            owning_id: field(OWNING_ID_KEY)?,
            related_id: field(RELATED_ID_KEY)?,
        })
    }
}

/// Result of importing one relation batch: one entry per edge, in input order.
#[derive(Debug)]
pub struct RelationOutcome {
    pub spec: RelationSpec,
    pub edges: Vec<ImportResult<RelationEdge>>,
}

impl RelationOutcome {
    pub fn succeeded(&self) -> usize {
        self.edges.iter().filter(|e| e.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.edges.len() - self.succeeded()
    }
}

/// Imports relation edges into a store.
pub struct RelationImporter<'a> {
    store: &'a dyn ObjectStore,
    config: &'a ImportConfig,
}

impl<'a> RelationImporter<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a ImportConfig) -> Self {
        Self { store, config }
    }

    /// Links `spec.owner_class` objects to `spec.target_class` objects under
    /// `spec.relation_key`, one edge per record.
    ///
    /// Edges are independent: a failing edge never stops its siblings.
    pub async fn import_relations(
        &self,
        spec: &RelationSpec,
        edges: &[RawRecord],
    ) -> RelationOutcome {
        let results = join_all(edges.iter().map(|edge| self.import_edge(spec, edge))).await;
        let outcome = RelationOutcome {
            spec: spec.clone(),
            edges: results,
        };
        if self.config.trace {
            info!(
                "Imported relation {}: {} succeeded, {} failed",
                spec,
                outcome.succeeded(),
                outcome.failed()
            );
        }
        outcome
    }

    async fn import_edge(&self, spec: &RelationSpec, record: &RawRecord) -> ImportResult<RelationEdge> {
        let edge = RelationEdge::from_record(record).inspect_err(|e| {
            warn!("Skipping edge of {}: {}", spec, e);
        })?;

        let owner = ObjectRef::new(&spec.owner_class, &edge.owning_id);
        let target = ObjectRef::new(&spec.target_class, &edge.related_id);
        self.store
            .add_relation(&owner, &spec.relation_key, &target)
            .await
            .map_err(|e| {
                warn!("Linking {} -> {} failed: {}", owner, target, e);
                ImportError::storage(format!("{spec} ({owner} -> {target})"), e)
            })?;

        debug!("Related {} -> {} on {}", owner, target, spec.relation_key);
        Ok(edge)
    }
}
