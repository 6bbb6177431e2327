//! Digest rendering.

use std::cmp::Ordering;
use std::fmt;

use crate::aggregate::CountTable;

/// A rendered digest, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryMessage {
    pub title: String,
    pub label: String,
    pub lines: Vec<String>,
}

impl SummaryMessage {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for SummaryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Render `counts` under `title` for the day labelled `label`.
///
/// Owners are ranked by count (highest first), then by name ignoring case,
/// so equal tables always render identically.
pub fn format(title: &str, label: &str, counts: &CountTable) -> SummaryMessage {
    let lines = if counts.is_empty() {
        vec![format!("🔔 {title} — no new cards on {label}.")]
    } else {
        let mut ranked: Vec<(&str, u32)> = counts.iter().collect();
        ranked.sort_by(|a, b| rank(*a, *b));

        std::iter::once(format!("🔔 {title} on {label}:"))
            .chain(ranked.into_iter().map(|(owner, n)| format!("{owner}: {n}")))
            .collect()
    };

    SummaryMessage {
        title: title.to_string(),
        label: label.to_string(),
        lines,
    }
}

fn rank((a_name, a_count): (&str, u32), (b_name, b_count): (&str, u32)) -> Ordering {
    b_count
        .cmp(&a_count)
        .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
        .then_with(|| a_name.cmp(b_name))
}
