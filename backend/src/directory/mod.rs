//! Directory (LDAP) export.
//!
//! Directory queries are run by an external job that writes a uid-keyed
//! JSON export:
//!
//! ```json
//! {
//!   "jdoe": {
//!     "uid": "jdoe",
//!     "sn": "Doe",
//!     "umOptionalTitle": null,
//!     "memberOf": ["Departmental_Groups:Libraries:Staff_Directory:FTE_50"]
//!   }
//! }
//! ```
//!
//! Single-valued attributes become the "LDAP" person source; `memberOf`
//! is decoded by [`membership::MembershipInfo`].

pub mod membership;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::{DirectoryError, DirectoryResult};
use crate::models::FieldMap;

pub use membership::MembershipInfo;

/// Multi-valued group membership attribute.
pub const MEMBER_OF: &str = "memberOf";

/// An attribute value as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Single(String),
    Multi(Vec<Option<String>>),
}

impl AttributeValue {
    /// The value, or the first value of a multi-valued attribute.
    pub fn first(&self) -> Option<&str> {
        match self {
            AttributeValue::Single(value) => Some(value),
            AttributeValue::Multi(values) => values.first().and_then(|v| v.as_deref()),
        }
    }
}

/// One person's directory attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryEntry(BTreeMap<String, Option<AttributeValue>>);

impl DirectoryEntry {
    /// Single-valued attributes as a person source (memberOf excluded).
    pub fn attributes(&self) -> FieldMap {
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != MEMBER_OF)
            .map(|(name, value)| {
                (
                    name.clone(),
                    value.as_ref().and_then(|v| v.first()).map(str::to_string),
                )
            })
            .collect()
    }

    /// Group memberships, or `None` when the attribute is absent.
    pub fn memberships(&self) -> Option<Vec<Option<String>>> {
        match self.0.get(MEMBER_OF)? {
            Some(AttributeValue::Multi(values)) => Some(values.clone()),
            Some(AttributeValue::Single(value)) => Some(vec![Some(value.clone())]),
            None => None,
        }
    }

    /// Decoded membership facts.
    pub fn membership_info(&self) -> MembershipInfo {
        let memberships = self.memberships();
        MembershipInfo::decode(memberships.as_deref())
    }
}

/// The directory export, keyed by uid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
    entries: BTreeMap<String, DirectoryEntry>,
}

impl Directory {
    pub fn from_json(json: &str) -> DirectoryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> DirectoryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json(&content)?;
        debug!(path = %path.display(), entries = directory.len(), "Loaded directory export");
        Ok(directory)
    }

    pub fn get(&self, uid: &str) -> Option<&DirectoryEntry> {
        self.entries.get(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
