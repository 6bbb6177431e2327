//! Per-owner counting.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::owners::Owner;

/// Owner -> number of items attributed to them. Counts are always positive.
///
/// Only [`aggregate`] builds one; afterwards it is read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountTable(BTreeMap<Owner, u32>);

impl CountTable {
    pub fn get(&self, owner: &str) -> Option<u32> {
        self.0.get(owner).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(owner, count)| (owner.as_str(), *count))
    }

    /// Sum of all counts (multi-owner items count once per owner entry).
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

impl<S: Into<Owner>> FromIterator<(S, u32)> for CountTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(owner, count)| (owner.into(), count))
                .collect(),
        )
    }
}

/// Case-insensitive set of owner names to keep.
///
/// Blank names are kept as entries: `--only-owners ""` matches no real owner
/// and so keeps nothing, while an allow-list built from no names at all is
/// empty and filters nothing.
#[derive(Debug, Clone, Default)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|name| normalize(name.as_ref()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, owner: &str) -> bool {
        self.0.contains(&normalize(owner))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Count items per owner.
///
/// Every entry of an item's owner list adds one count, so a name listed
/// twice on one item (two members sharing a full name, two `OWNER:` labels)
/// counts twice. With an allow-list, owners that do not match an entry are
/// dropped from the result. An allow-list with no entries filters nothing.
pub fn aggregate<I, L>(owner_lists: I, allow_list: Option<&AllowList>) -> CountTable
where
    I: IntoIterator<Item = L>,
    L: AsRef<[Owner]>,
{
    let mut counts: BTreeMap<Owner, u32> = BTreeMap::new();
    for owners in owner_lists {
        for owner in owners.as_ref() {
            *counts.entry(owner.clone()).or_insert(0) += 1;
        }
    }

    if let Some(allow) = allow_list.filter(|a| !a.is_empty()) {
        counts.retain(|owner, _| allow.allows(owner));
    }

    CountTable(counts)
}
