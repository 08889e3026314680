//! Record partitioner: splits an [`ImportBatch`] into entity and relation
//! batches and parses relation batch names.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::DEFAULT_JOIN_PREFIX;
use crate::{ImportError, ImportResult};

/// One exported object: attribute name -> JSON value.
pub type RawRecord = Value;

/// Separator between the segments of a relation batch name.
pub const RELATION_KEY_SEPARATOR: char = ':';

/// The full input of an import run: batch name -> ordered records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    batches: BTreeMap<String, Vec<RawRecord>>,
}

impl ImportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a combined export: a JSON object mapping batch names to lists.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let batches = serde_json::from_slice(bytes)?;
        Ok(Self { batches })
    }

    /// Adds records under `name`, appending if the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, records: Vec<RawRecord>) {
        self.batches.entry(name.into()).or_default().extend(records);
    }

    pub fn get(&self, name: &str) -> Option<&[RawRecord]> {
        self.batches.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl FromIterator<(String, Vec<RawRecord>)> for ImportBatch {
    fn from_iter<I: IntoIterator<Item = (String, Vec<RawRecord>)>>(iter: I) -> Self {
        let mut batch = Self::new();
        for (name, records) in iter {
            batch.insert(name, records);
        }
        batch
    }
}

impl IntoIterator for ImportBatch {
    type Item = (String, Vec<RawRecord>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<RawRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.into_iter()
    }
}

/// An [`ImportBatch`] reclassified by batch name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned {
    /// Class name -> records.
    pub entities: Vec<(String, Vec<RawRecord>)>,
    /// Unparsed relation batch name -> edges.
    pub relations: Vec<(String, Vec<RawRecord>)>,
}

/// Splits a batch by name: names starting with `join_prefix` are relation
/// batches, everything else is an entity class. Nothing is dropped.
pub fn partition(batch: ImportBatch, join_prefix: &str) -> Partitioned {
    let mut partitioned = Partitioned::default();
    for (name, records) in batch {
        if name.starts_with(join_prefix) {
            partitioned.relations.push((name, records));
        } else {
            partitioned.entities.push((name, records));
        }
    }
    partitioned
}

/// A parsed `<prefix>:<relationKey>:<OwnerClass>:<TargetClass>` batch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationSpec {
    /// The join prefix the name was parsed with, `_Join` by default.
    pub join_prefix: String,
    pub relation_key: String,
    pub owner_class: String,
    pub target_class: String,
}

impl RelationSpec {
    /// Parses a relation batch name with the given prefix.
    ///
    /// The name must have exactly four non-empty colon-separated segments and
    /// the first must be the prefix itself.
    pub fn parse(name: &str, join_prefix: &str) -> ImportResult<Self> {
        let segments: Vec<&str> = name.split(RELATION_KEY_SEPARATOR).collect();
        match segments.as_slice() {
            [prefix, key, owner, target]
                if *prefix == join_prefix
                    && !key.is_empty()
                    && !owner.is_empty()
                    && !target.is_empty() =>
            {
                Ok(Self {
                    join_prefix: prefix.to_string(),
                    relation_key: key.to_string(),
                    owner_class: owner.to_string(),
                    target_class: target.to_string(),
                })
            }
            _ => Err(ImportError::InvalidRelationKey(name.to_string())),
        }
    }

    /// True if either endpoint class is `class_name`.
    pub fn references(&self, class_name: &str) -> bool {
        self.owner_class == class_name || self.target_class == class_name
    }
}

impl fmt::Display for RelationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.join_prefix, self.relation_key, self.owner_class, self.target_class
        )
    }
}

/// Parses a relation batch name using the default `_Join` prefix.
pub fn parse_relation_key(name: &str) -> ImportResult<RelationSpec> {
    RelationSpec::parse(name, DEFAULT_JOIN_PREFIX)
}
