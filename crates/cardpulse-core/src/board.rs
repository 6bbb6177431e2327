//! Board items as read from the work-tracking service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a tracked item (card).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation instant embedded in the id.
    ///
    /// Card ids carry their creation time as a Unix timestamp (seconds, UTC)
    /// in the first 8 hex characters. Returns `None` for ids that do not.
    pub fn embedded_timestamp(&self) -> Option<DateTime<Utc>> {
        let prefix = self.0.get(..8)?;
        let secs = u32::from_str_radix(prefix, 16).ok()?;
        DateTime::from_timestamp(i64::from(secs), 0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A member assigned to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub full_name: String,
}

/// A label attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    pub name: String,
}

/// A tracked work item, fetched once per id and read-only within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub members: Vec<MemberRef>,
    pub labels: Vec<LabelRef>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            members: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn with_member(mut self, full_name: impl Into<String>) -> Self {
        self.members.push(MemberRef {
            full_name: full_name.into(),
        });
        self
    }

    pub fn with_label(mut self, name: impl Into<String>) -> Self {
        self.labels.push(LabelRef { name: name.into() });
        self
    }
}
