//! Owner resolution.
//!
//! An item's owners come from an explicit, ordered list of rules. Rules are
//! tried top to bottom and the first one that yields any owner wins; results
//! are never merged across rules.

use crate::board::Item;

/// Display name an item is attributed to.
pub type Owner = String;

/// Sentinel owner for items nobody claims.
pub const UNASSIGNED: &str = "Unassigned/Other";

/// Case-insensitive label prefix that names an owner, e.g. `OWNER: Ana`.
const OWNER_LABEL_PREFIX: &str = "OWNER:";

/// One step of the owner fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRule {
    /// Full names of assigned members, in source order.
    AssignedMembers,
    /// Text after the colon of `OWNER:<value>` labels.
    OwnerLabels,
    /// The [`UNASSIGNED`] sentinel.
    Unassigned,
}

/// Chain used by the digest: always yields at least one owner.
pub const DIGEST_RULES: [OwnerRule; 3] = [
    OwnerRule::AssignedMembers,
    OwnerRule::OwnerLabels,
    OwnerRule::Unassigned,
];

/// Chain used by the board export: may yield no owner at all.
pub const EXPORT_RULES: [OwnerRule; 2] = [OwnerRule::AssignedMembers, OwnerRule::OwnerLabels];

impl OwnerRule {
    pub fn apply(self, item: &Item) -> Vec<Owner> {
        match self {
            OwnerRule::AssignedMembers => item
                .members
                .iter()
                .map(|m| m.full_name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            OwnerRule::OwnerLabels => item
                .labels
                .iter()
                .filter_map(|label| owner_from_label(&label.name))
                .collect(),
            OwnerRule::Unassigned => vec![UNASSIGNED.to_string()],
        }
    }
}

/// Evaluate `rules` in order; the first non-empty result wins.
pub fn resolve_with(rules: &[OwnerRule], item: &Item) -> Vec<Owner> {
    rules
        .iter()
        .map(|rule| rule.apply(item))
        .find(|owners| !owners.is_empty())
        .unwrap_or_default()
}

/// Owners of `item` for the digest. Never empty.
pub fn resolve_owners(item: &Item) -> Vec<Owner> {
    resolve_with(&DIGEST_RULES, item)
}

fn owner_from_label(raw: &str) -> Option<Owner> {
    let name = raw.trim();
    let prefix = name.get(..OWNER_LABEL_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(OWNER_LABEL_PREFIX) {
        return None;
    }
    let value = name[OWNER_LABEL_PREFIX.len()..].trim();
    (!value.is_empty()).then(|| value.to_string())
}
