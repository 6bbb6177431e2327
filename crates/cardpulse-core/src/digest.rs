//! The digest pipeline: window -> creation events -> owners -> counts ->
//! message -> publisher.
//!
//! Stages run strictly one after another. The window-level event query is
//! all-or-nothing; a failed per-item owner lookup only drops that item.

use tracing::{info, warn};

use crate::aggregate::{aggregate, AllowList, CountTable};
use crate::board::ItemId;
use crate::error::Result;
use crate::format::{format, SummaryMessage};
use crate::integrations::traits::{EventSource, OwnerResolver, Publisher};
use crate::window::TimeWindow;

/// What to report on.
#[derive(Debug, Clone)]
pub struct DigestRequest {
    pub board_id: String,
    pub window: TimeWindow,
    pub title: String,
    pub allow_list: Option<AllowList>,
}

/// An item whose owners could not be looked up.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    pub id: ItemId,
    pub reason: String,
}

/// Outcome of building a digest.
#[derive(Debug, Clone)]
pub struct DigestReport {
    pub message: SummaryMessage,
    pub counts: CountTable,
    pub items_seen: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Build the digest without delivering it.
pub async fn build_digest<S, R>(source: &S, resolver: &R, request: &DigestRequest) -> Result<DigestReport>
where
    S: EventSource + ?Sized,
    R: OwnerResolver + ?Sized,
{
    let ids = source.list_created(&request.board_id, &request.window).await?;

    let mut owner_lists = Vec::with_capacity(ids.len());
    let mut skipped = Vec::new();
    for id in &ids {
        match resolver.resolve(id).await {
            Ok(owners) => owner_lists.push(owners),
            Err(e) if e.is_source_unavailable() => {
                warn!(card = %id, error = %e, "skipping card: owner lookup failed");
                skipped.push(SkippedItem {
                    id: id.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let counts = aggregate(&owner_lists, request.allow_list.as_ref());
    let message = format(&request.title, &request.window.label, &counts);

    info!(
        board_id = %request.board_id,
        label = %request.window.label,
        window_hours = request.window.span().num_hours(),
        cards = ids.len(),
        skipped = skipped.len(),
        owners = counts.len(),
        attributed = counts.total(),
        "built digest"
    );

    Ok(DigestReport {
        message,
        counts,
        items_seen: ids.len(),
        skipped,
    })
}

/// Build the digest and publish it once.
pub async fn run_digest<S, R, P>(
    source: &S,
    resolver: &R,
    publisher: &P,
    request: &DigestRequest,
) -> Result<DigestReport>
where
    S: EventSource + ?Sized,
    R: OwnerResolver + ?Sized,
    P: Publisher + ?Sized,
{
    let report = build_digest(source, resolver, request).await?;
    publisher.publish(&report.message.text()).await?;
    Ok(report)
}
