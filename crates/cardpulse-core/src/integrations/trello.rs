//! Trello integration -- creation events, card owners and open-card listing
//! via the Trello REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::board::{Item, ItemId, LabelRef, MemberRef};
use crate::config::TrelloCredentials;
use crate::error::{ConfigError, DigestError, Result};
use crate::integrations::traits::{BoardReader, EventSource, OwnerResolver};
use crate::owners::{resolve_owners, Owner};
use crate::window::TimeWindow;

/// Maximum number of actions Trello returns for one request. Only the first
/// page is read.
pub const PAGE_SIZE: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TrelloClient {
    http: Client,
    base_url: Url,
    credentials: TrelloCredentials,
}

#[derive(Debug, Deserialize)]
struct ActionPayload {
    #[serde(default)]
    data: Option<ActionData>,
}

#[derive(Debug, Deserialize)]
struct ActionData {
    #[serde(default)]
    card: Option<CardRef>,
}

#[derive(Debug, Deserialize)]
struct CardRef {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    closed: Option<bool>,
    #[serde(default)]
    labels: Option<Vec<LabelPayload>>,
    #[serde(default)]
    members: Option<Vec<MemberPayload>>,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberPayload {
    #[serde(default)]
    full_name: Option<String>,
}

impl CardPayload {
    fn into_item(self, fallback_id: Option<&ItemId>) -> Item {
        let id = match (self.id, fallback_id) {
            (Some(id), _) if !id.is_empty() => ItemId::new(id),
            (_, Some(fallback)) => fallback.clone(),
            _ => ItemId::new(""),
        };
        Item {
            id,
            name: self.name.unwrap_or_default(),
            members: self
                .members
                .unwrap_or_default()
                .into_iter()
                .map(|m| MemberRef {
                    full_name: m.full_name.unwrap_or_default(),
                })
                .collect(),
            labels: self
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|l| LabelRef {
                    name: l.name.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl TrelloClient {
    /// Build a client against `base_url` (normally `https://api.trello.com`).
    pub fn new(base_url: &str, credentials: TrelloCredentials) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "trello.base_url".into(),
                message: format!("'{base_url}' is not an http(s) base URL"),
            })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DigestError::source_unavailable("trello client", e))?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` with credentials attached; non-2xx responses become
    /// [`DigestError::SourceUnavailable`] carrying the response body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        context: &str,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("token", self.credentials.token.as_str()),
            ])
            .query(query)
            .send()
            .await
            .map_err(|e| DigestError::source_unavailable(context, e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DigestError::source_unavailable(
                context,
                format!("HTTP {status}: {body}"),
            ));
        }

        resp.json::<T>()
            .await
            .map_err(|e| DigestError::source_unavailable(context, e.without_url()))
    }

    /// Fetch one card with its labels and assigned members.
    pub async fn fetch_item(&self, item_id: &ItemId) -> Result<Item> {
        let url = self.endpoint(&["1", "cards", item_id.as_str()]);
        let card: CardPayload = self
            .get_json(
                &format!("card {item_id}"),
                url,
                &[
                    ("fields", "name,labels,idMembers"),
                    ("members", "true"),
                    ("member_fields", "fullName"),
                ],
            )
            .await?;
        Ok(card.into_item(Some(item_id)))
    }
}

#[async_trait]
impl EventSource for TrelloClient {
    async fn list_created(&self, board_id: &str, window: &TimeWindow) -> Result<Vec<ItemId>> {
        let url = self.endpoint(&["1", "boards", board_id, "actions"]);
        let since = window.since_param();
        let before = window.before_param();
        let limit = PAGE_SIZE.to_string();

        let actions: Vec<ActionPayload> = self
            .get_json(
                &format!("board {board_id} actions"),
                url,
                &[
                    ("filter", "createCard"),
                    ("since", since.as_str()),
                    ("before", before.as_str()),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;

        if actions.len() >= PAGE_SIZE {
            warn!(
                board_id,
                page_size = PAGE_SIZE,
                "creation events filled a whole page; later events in the window are not counted"
            );
        }

        let ids: Vec<ItemId> = actions
            .into_iter()
            .filter_map(|a| a.data?.card?.id)
            .filter(|id| !id.is_empty())
            .map(ItemId::new)
            .collect();

        info!(board_id, %since, %before, cards = ids.len(), "fetched creation events");
        Ok(ids)
    }
}

#[async_trait]
impl OwnerResolver for TrelloClient {
    async fn resolve(&self, item_id: &ItemId) -> Result<Vec<Owner>> {
        let item = self.fetch_item(item_id).await?;
        Ok(resolve_owners(&item))
    }
}

#[async_trait]
impl BoardReader for TrelloClient {
    async fn list_open_items(&self, board_id: &str) -> Result<Vec<Item>> {
        let url = self.endpoint(&["1", "boards", board_id, "cards"]);
        let cards: Vec<CardPayload> = self
            .get_json(
                &format!("board {board_id} cards"),
                url,
                &[
                    ("filter", "open"),
                    ("fields", "name,id,idMembers,labels,closed"),
                    ("members", "true"),
                    ("member_fields", "fullName,username"),
                ],
            )
            .await?;

        let items: Vec<Item> = cards
            .into_iter()
            .filter(|card| !card.closed.unwrap_or(false))
            .map(|card| card.into_item(None))
            .collect();

        info!(board_id, cards = items.len(), "fetched open cards");
        Ok(items)
    }
}
