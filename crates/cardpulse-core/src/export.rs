//! Bulk CSV export of open cards across boards.
//!
//! Each row names the card, its board, its owners (members, else `OWNER:`
//! labels, joined by `"; "`) and the Monday of the local week the card was
//! created in. The creation instant comes from the card id, since there is no
//! creation event to read for cards outside a reporting window.

use std::io;
use std::path::Path;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::info;

use crate::board::Item;
use crate::config::BoardRef;
use crate::error::Result;
use crate::integrations::traits::BoardReader;
use crate::owners::{resolve_with, EXPORT_RULES};
use crate::window::{local_date, week_start};

const OWNER_SEPARATOR: &str = "; ";
const WEEK_FORMAT: &str = "%b %d";

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub card_name: String,
    pub board_name: String,
    pub owner: String,
    pub week_created: String,
}

/// Row for `item`, or `None` for unnamed cards.
pub fn export_row(item: &Item, board_name: &str, tz: Tz) -> Option<ExportRow> {
    let card_name = item.name.trim();
    if card_name.is_empty() {
        return None;
    }

    let week_created = item
        .id
        .embedded_timestamp()
        .and_then(|created| week_start(local_date(created, tz)))
        .map(|monday| monday.format(WEEK_FORMAT).to_string())
        .unwrap_or_default();

    Some(ExportRow {
        card_name: card_name.to_string(),
        board_name: board_name.to_string(),
        owner: resolve_with(&EXPORT_RULES, item).join(OWNER_SEPARATOR),
        week_created,
    })
}

/// Fetch every board in order. Any board failing aborts the export.
pub async fn collect_rows<B>(reader: &B, boards: &[BoardRef], tz: Tz) -> Result<Vec<ExportRow>>
where
    B: BoardReader + ?Sized,
{
    let mut rows = Vec::new();
    for board in boards {
        let items = reader.list_open_items(&board.id).await?;
        let before = rows.len();
        rows.extend(
            items
                .iter()
                .filter_map(|item| export_row(item, &board.name, tz)),
        );
        info!(board = %board.name, id = %board.id, rows = rows.len() - before, "exported board");
    }
    Ok(rows)
}

pub fn write_csv<W: io::Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        out.write_record(["card_name", "board_name", "owner", "week_created"])?;
    }
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_file(rows: &[ExportRow], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(rows, io::BufWriter::new(file))
}
