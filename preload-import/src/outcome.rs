//! Aggregate result of an import run.

use std::collections::BTreeSet;
use std::fmt;

use crate::class_importer::ClassOutcome;
use crate::partition::RelationSpec;
use crate::relation_importer::RelationOutcome;
use crate::ImportError;

/// What an outcome entry is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportUnit {
    /// An entity class.
    Class(String),
    /// A parsed relation batch.
    Relation(RelationSpec),
    /// A batch whose name could not be parsed.
    Batch(String),
}

impl fmt::Display for ImportUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportUnit::Class(name) | ImportUnit::Batch(name) => write!(f, "{name}"),
            ImportUnit::Relation(spec) => write!(f, "{spec}"),
        }
    }
}

/// A unit that was imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub unit: ImportUnit,
    pub message: String,
}

/// A class left alone because the store already had it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub class_name: String,
    pub message: String,
}

/// A hard failure, attributed to the unit it happened in.
#[derive(Debug)]
pub struct Failure {
    pub unit: ImportUnit,
    pub error: ImportError,
}

/// Merged result of one import run.
///
/// A run never stops early: every batch contributes entries here. Skips are
/// informational; only `failed` entries are errors.
#[derive(Debug, Default)]
pub struct Outcome {
    pub imported: Vec<Imported>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failure>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the classes that were skipped.
    pub fn skipped_classes(&self) -> BTreeSet<&str> {
        self.skipped.iter().map(|s| s.class_name.as_str()).collect()
    }

    /// Failures attributed to `unit`.
    pub fn failures_for<'a>(&'a self, unit: &'a ImportUnit) -> impl Iterator<Item = &'a Failure> {
        self.failed.iter().filter(move |f| &f.unit == unit)
    }

    /// Appends all entries of `other`.
    pub fn merge(&mut self, other: Outcome) {
        self.imported.extend(other.imported);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    pub(crate) fn push_failure(&mut self, unit: ImportUnit, error: ImportError) {
        self.failed.push(Failure { unit, error });
    }

    pub(crate) fn record_class(&mut self, outcome: ClassOutcome) {
        match outcome {
            ClassOutcome::Imported {
                class_name,
                count,
                elapsed,
            } => self.imported.push(Imported {
                message: format!(
                    "imported {count} objects on {class_name} in {:.3}s",
                    elapsed.as_secs_f64()
                ),
                unit: ImportUnit::Class(class_name),
            }),
            ClassOutcome::Skipped { class_name } => self.skipped.push(Skipped {
                message: format!("skipped {class_name}: objects already present in the local store"),
                class_name,
            }),
            ClassOutcome::Failed { class_name, errors } => {
                for error in errors {
                    self.push_failure(ImportUnit::Class(class_name.clone()), error);
                }
            }
        }
    }

    pub(crate) fn record_relation(&mut self, outcome: RelationOutcome) {
        let RelationOutcome { spec, edges } = outcome;
        for edge in edges {
            match edge {
                Ok(edge) => self.imported.push(Imported {
                    message: format!(
                        "related {}:{} -> {}:{} on {}",
                        spec.owner_class,
                        edge.owning_id,
                        spec.target_class,
                        edge.related_id,
                        spec.relation_key
                    ),
                    unit: ImportUnit::Relation(spec.clone()),
                }),
                Err(error) => self.push_failure(ImportUnit::Relation(spec.clone()), error),
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} skipped, {} failed",
            self.imported.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}
