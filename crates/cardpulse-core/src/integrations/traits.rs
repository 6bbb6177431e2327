use async_trait::async_trait;

use crate::board::{Item, ItemId};
use crate::error::Result;
use crate::owners::Owner;
use crate::window::TimeWindow;

/// Finds items created on a board during a window.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Ids of items whose creation event falls in `[start_utc, end_utc)`.
    ///
    /// Only the first page of events is returned.
    async fn list_created(&self, board_id: &str, window: &TimeWindow) -> Result<Vec<ItemId>>;
}

/// Maps an item to the people responsible for it.
#[async_trait]
pub trait OwnerResolver: Send + Sync {
    /// Ordered, non-empty owner list for `item_id`.
    async fn resolve(&self, item_id: &ItemId) -> Result<Vec<Owner>>;
}

/// Delivers a rendered digest to a chat endpoint.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str) -> Result<()>;
}

/// Lists every open item on a board, for bulk export.
#[async_trait]
pub trait BoardReader: Send + Sync {
    async fn list_open_items(&self, board_id: &str) -> Result<Vec<Item>>;
}
