use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Acl, AttributeValue, ObjectRef};

/// Attribute holding an object's access control list.
pub const ACL_KEY: &str = "_acl";

/// Revision state of a stored object.
///
/// Imported objects are stored as if they had just been fetched from a
/// server: complete and clean, so nothing treats them as pending local edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    /// All server fields are known locally.
    pub complete: bool,
    /// The object carries local changes not yet saved upstream.
    pub dirty: bool,
}

impl ObjectState {
    /// State of an object that mirrors server data.
    pub const fn fetched() -> Self {
        Self {
            complete: true,
            dirty: false,
        }
    }

    /// State of an object created or edited locally.
    pub const fn local() -> Self {
        Self {
            complete: false,
            dirty: true,
        }
    }
}

impl Default for ObjectState {
    fn default() -> Self {
        Self::local()
    }
}

/// A decoded record: class, identity, timestamps and native attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub class_name: String,
    pub object_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub state: ObjectState,
}

impl Entity {
    /// Creates an empty entity in the fetched state.
    pub fn new(class_name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            object_id: object_id.into(),
            created_at: None,
            updated_at: None,
            attributes: BTreeMap::new(),
            state: ObjectState::fetched(),
        }
    }

    /// Returns a reference to this entity.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(&self.class_name, &self.object_id)
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Extract a verbatim string attribute.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    /// Extract a pointer attribute.
    pub fn get_pointer(&self, key: &str) -> Option<&ObjectRef> {
        self.get(key).and_then(AttributeValue::as_pointer)
    }

    /// Returns the decoded access control list, if the record carried one.
    pub fn acl(&self) -> Option<&Acl> {
        self.get(ACL_KEY).and_then(AttributeValue::as_acl)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }
}
