//! Import orchestrator: entity classes first, then the relations that depend
//! on them.
//!
//! 1. Partition the batch; unparsable relation names become failures.
//! 2. Import every entity class concurrently and wait for all of them.
//! 3. Drop relation batches whose owner or target class was skipped.
//! 4. Import the remaining relation batches concurrently.
//! 5. Merge everything into one [`Outcome`].

use preload_store::ObjectStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::class_importer::{ClassImporter, ClassOutcome};
use crate::outcome::{ImportUnit, Outcome};
use crate::partition::{partition, ImportBatch, Partitioned, RawRecord, RelationSpec};
use crate::relation_importer::{RelationImporter, RelationOutcome};
use crate::{ImportConfig, ImportError};

/// Runs imports against one store with one configuration.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    config: Arc<ImportConfig>,
}

impl Orchestrator {
    /// Creates an orchestrator with the default configuration.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_config(store, ImportConfig::default())
    }

    pub fn with_config(store: Arc<dyn ObjectStore>, config: ImportConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Imports a whole batch. Partial failures are reported in the returned
    /// [`Outcome`], never as an early return.
    pub async fn run(&self, batch: ImportBatch) -> Outcome {
        let Partitioned {
            entities,
            relations,
        } = partition(batch, &self.config.join_prefix);

        let mut specs = Vec::with_capacity(relations.len());
        let mut spec_failures = Vec::new();
        for (name, edges) in relations {
            match RelationSpec::parse(&name, &self.config.join_prefix) {
                Ok(spec) => specs.push((spec, edges)),
                Err(e) => {
                    warn!("Rejecting relation batch: {}", e);
                    spec_failures.push((ImportUnit::Batch(name), e));
                }
            }
        }

        let mut outcome = Outcome::new();

        let class_outcomes = self.import_classes(entities).await;
        let skipped: HashSet<String> = class_outcomes
            .iter()
            .filter(|o| o.is_skipped())
            .map(|o| o.class_name().to_string())
            .collect();
        for class_outcome in class_outcomes {
            outcome.record_class(class_outcome);
        }

        let (kept, dropped): (Vec<_>, Vec<_>) = specs
            .into_iter()
            .partition(|(spec, _)| !skipped.iter().any(|class| spec.references(class)));
        if self.config.trace {
            for (spec, _) in &dropped {
                info!("Skipping import of relation {}: endpoint class was skipped", spec);
            }
        }

        for relation_outcome in self.import_relations(kept).await {
            outcome.record_relation(relation_outcome);
        }

        for (unit, error) in spec_failures {
            outcome.push_failure(unit, error);
        }

        if self.config.trace {
            info!("Import finished: {}", outcome);
        }
        outcome
    }

    async fn import_classes(&self, classes: Vec<(String, Vec<RawRecord>)>) -> Vec<ClassOutcome> {
        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();
        for (class_name, records) in classes {
            let store = Arc::clone(&self.store);
            let config = Arc::clone(&self.config);
            let name = class_name.clone();
            let handle = tasks.spawn(async move {
                ClassImporter::new(store.as_ref(), &config)
                    .import_class(&name, &records)
                    .await
            });
            names.insert(handle.id(), class_name);
        }

        let mut outcomes = Vec::with_capacity(names.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, class_outcome)) => outcomes.push(class_outcome),
                Err(e) => {
                    let class_name = names.remove(&e.id()).unwrap_or_default();
                    warn!("Import task for {} failed: {}", class_name, e);
                    outcomes.push(ClassOutcome::Failed {
                        errors: vec![ImportError::TaskFailed {
                            context: class_name.clone(),
                            reason: e.to_string(),
                        }],
                        class_name,
                    });
                }
            }
        }
        outcomes
    }

    async fn import_relations(
        &self,
        relations: Vec<(RelationSpec, Vec<RawRecord>)>,
    ) -> Vec<RelationOutcome> {
        let mut tasks = JoinSet::new();
        let mut specs = HashMap::new();
        for (spec, edges) in relations {
            let store = Arc::clone(&self.store);
            let config = Arc::clone(&self.config);
            let task_spec = spec.clone();
            let handle = tasks.spawn(async move {
                RelationImporter::new(store.as_ref(), &config)
                    .import_relations(&task_spec, &edges)
                    .await
            });
            specs.insert(handle.id(), spec);
        }

        let mut outcomes = Vec::with_capacity(specs.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, relation_outcome)) => outcomes.push(relation_outcome),
                Err(e) => {
                    let Some(spec) = specs.remove(&e.id()) else {
                        warn!("Relation import task failed: {}", e);
                        continue;
                    };
                    warn!("Import task for {} failed: {}", spec, e);
                    outcomes.push(RelationOutcome {
                        edges: vec![Err(ImportError::TaskFailed {
                            context: spec.to_string(),
                            reason: e.to_string(),
                        })],
                        spec,
                    });
                }
            }
        }
        outcomes
    }
}
