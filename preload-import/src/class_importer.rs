//! Entity importer: one class per call, all-or-nothing.

use preload_store::ObjectStore;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::decode::decode_record;
use crate::partition::RawRecord;
use crate::{ImportConfig, ImportError};

/// Result of importing one entity class.
#[derive(Debug)]
pub enum ClassOutcome {
    /// Every record was decoded and persisted.
    Imported {
        class_name: String,
        count: usize,
        elapsed: Duration,
    },
    /// The store already held objects of this class; nothing was written.
    Skipped { class_name: String },
    /// Nothing was written.
    Failed {
        class_name: String,
        errors: Vec<ImportError>,
    },
}

impl ClassOutcome {
    pub fn class_name(&self) -> &str {
        match self {
            ClassOutcome::Imported { class_name, .. }
            | ClassOutcome::Skipped { class_name }
            | ClassOutcome::Failed { class_name, .. } => class_name,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ClassOutcome::Skipped { .. })
    }
}

/// Imports the records of one entity class into a store.
pub struct ClassImporter<'a> {
    store: &'a dyn ObjectStore,
    config: &'a ImportConfig,
}

impl<'a> ClassImporter<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a ImportConfig) -> Self {
        Self { store, config }
    }

    /// Imports `records` as objects of `class_name`.
    ///
    /// Skips the class if the store already has any object of it. Otherwise
    /// decodes every record and, only if all succeed, saves them in one
    /// atomic write.
    pub async fn import_class(&self, class_name: &str, records: &[RawRecord]) -> ClassOutcome {
        let started = Instant::now();
        if self.config.trace {
            info!("Importing {} objects on {}", records.len(), class_name);
        }

        match self.store.contains_class(class_name).await {
            Ok(true) => {
                if self.config.trace {
                    info!("Skipping import for {}: objects already present", class_name);
                }
                return ClassOutcome::Skipped {
                    class_name: class_name.to_string(),
                };
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Existence check failed for {}: {}", class_name, e);
                return ClassOutcome::Failed {
                    class_name: class_name.to_string(),
                    errors: vec![ImportError::storage(class_name, e)],
                };
            }
        }

        let mut entities = Vec::with_capacity(records.len());
        let mut errors = Vec::new();
        for (index, record) in records.iter().enumerate() {
            match decode_record(class_name, record) {
                Ok(entity) => entities.push(entity),
                Err(source) => errors.push(ImportError::Decode {
                    class_name: class_name.to_string(),
                    index,
                    source,
                }),
            }
        }

        if !errors.is_empty() {
            warn!(
                "Not importing {}: {} of {} records failed to decode",
                class_name,
                errors.len(),
                records.len()
            );
            return ClassOutcome::Failed {
                class_name: class_name.to_string(),
                errors,
            };
        }

        let count = entities.len();
        if let Err(e) = self.store.save_all(entities).await {
            warn!("Saving {} failed: {}", class_name, e);
            return ClassOutcome::Failed {
                class_name: class_name.to_string(),
                errors: vec![ImportError::storage(class_name, e)],
            };
        }

        let elapsed = started.elapsed();
        if self.config.trace {
            info!(
                "Imported {} objects on {} in {:.3}s",
                count,
                class_name,
                elapsed.as_secs_f64()
            );
        }
        ClassOutcome::Imported {
            class_name: class_name.to_string(),
            count,
            elapsed,
        }
    }
}
