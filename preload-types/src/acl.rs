//! Access control lists.
//!
//! An ACL grants read/write access to three kinds of principal: the public
//! (`*`), named roles (`role:<name>`) and individual users (any other key).
//! Anything not granted is denied.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key that designates public access.
pub const PUBLIC_KEY: &str = "*";

/// Prefix that designates a role principal.
pub const ROLE_PREFIX: &str = "role:";

/// Read/write grant for one principal. Absent flags mean no access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessFlags {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
}

impl AccessFlags {
    pub const fn new(read: bool, write: bool) -> Self {
        Self { read, write }
    }
}

/// Who an ACL entry applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    Public,
    Role(String),
    User(String),
}

impl Principal {
    /// Classifies an ACL key.
    pub fn from_key(key: &str) -> Self {
        if key == PUBLIC_KEY {
            Self::Public
        } else if let Some(role) = key.strip_prefix(ROLE_PREFIX) {
            Self::Role(role.to_string())
        } else {
            Self::User(key.to_string())
        }
    }
}

/// Access control list attached to an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    public: AccessFlags,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    roles: BTreeMap<String, AccessFlags>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    users: BTreeMap<String, AccessFlags>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the grant for a principal.
    pub fn set_access(&mut self, principal: Principal, flags: AccessFlags) {
        match principal {
            Principal::Public => self.public = flags,
            Principal::Role(name) => {
                self.roles.insert(name, flags);
            }
            Principal::User(id) => {
                self.users.insert(id, flags);
            }
        }
    }

    /// Returns the grant for a principal (no access if never set).
    pub fn access(&self, principal: &Principal) -> AccessFlags {
        match principal {
            Principal::Public => self.public,
            Principal::Role(name) => self.role_access(name),
            Principal::User(id) => self.user_access(id),
        }
    }

    pub fn public_access(&self) -> AccessFlags {
        self.public
    }

    pub fn role_access(&self, role: &str) -> AccessFlags {
        self.roles.get(role).copied().unwrap_or_default()
    }

    pub fn user_access(&self, user_id: &str) -> AccessFlags {
        self.users.get(user_id).copied().unwrap_or_default()
    }

    /// True if nothing is granted to anyone.
    pub fn is_empty(&self) -> bool {
        self.public == AccessFlags::default()
            && self.roles.values().all(|f| *f == AccessFlags::default())
            && self.users.values().all(|f| *f == AccessFlags::default())
    }
}
