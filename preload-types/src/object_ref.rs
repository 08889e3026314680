//! References to stored objects.
//!
//! A reference carries only identity: class name plus object id. It can be
//! built without a store round-trip and is what pointers and relation
//! endpoints decode to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Separator used by the compact `Class$objectId` pointer form.
pub const SHORTHAND_SEPARATOR: char = '$';

/// A reference to an object of a given class.
///
/// The object id is optional because a `Pointer` envelope may name only a
/// class. Relation endpoints always carry an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_id: Option<String>,
}

impl ObjectRef {
    /// Creates a reference to a known object.
    #[must_use]
    pub fn new(class_name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            object_id: Some(object_id.into()),
        }
    }

    /// Creates a reference that names a class but no object.
    #[must_use]
    pub fn without_id(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            object_id: None,
        }
    }

    /// Parses the compact `ClassName$objectId` form.
    ///
    /// Both halves must be non-empty.
    pub fn parse_shorthand(s: &str) -> Result<Self> {
        match s.split_once(SHORTHAND_SEPARATOR) {
            Some((class_name, object_id)) if !class_name.is_empty() && !object_id.is_empty() => {
                Ok(Self::new(class_name, object_id))
            }
            _ => Err(Error::InvalidPointer(s.to_string())),
        }
    }

    /// Returns the class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the object id, if any.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    /// Returns the object id, or an error naming the class if there is none.
    pub fn require_id(&self) -> Result<&str> {
        self.object_id
            .as_deref()
            .ok_or_else(|| Error::MissingObjectId(self.class_name.clone()))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object_id {
            Some(id) => write!(f, "{}{}{}", self.class_name, SHORTHAND_SEPARATOR, id),
            None => write!(f, "{}", self.class_name),
        }
    }
}

impl FromStr for ObjectRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_shorthand(s)
    }
}
