//! TOML-based configuration with an environment overlay.
//!
//! Holds:
//! - Trello credentials and API base URL
//! - The chat webhook endpoint
//! - Digest defaults (board, title, local time zone)
//! - Boards for the bulk export
//!
//! Configuration is read from `~/.config/cardpulse/config.toml` (when it
//! exists), then `TRELLO_API_KEY`, `TRELLO_TOKEN` and the webhook variable
//! named by `chat.webhook_env` (`GOOGLE_CHAT_WEBHOOK_URL` unless set)
//! override the file. The resulting value is built
//! once at startup and handed to whatever needs it.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_TRELLO_API_KEY: &str = "TRELLO_API_KEY";
pub const ENV_TRELLO_TOKEN: &str = "TRELLO_TOKEN";
pub const ENV_CHAT_WEBHOOK_URL: &str = "GOOGLE_CHAT_WEBHOOK_URL";

/// Trello API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_trello_base_url")]
    pub base_url: String,
}

/// Chat delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Environment variable that overrides `webhook_url`. A config for a
    /// second channel names its own (e.g. `LEADGEN_WEBHOOK_URL`).
    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,
}

/// Defaults for `cardpulse digest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_board_id")]
    pub board_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// IANA zone name, e.g. `America/Mexico_City`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// A board and the name it is exported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRef {
    pub id: String,
    pub name: String,
}

/// Defaults for `cardpulse export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_boards")]
    pub boards: Vec<BoardRef>,
    #[serde(default = "default_export_output")]
    pub output: PathBuf,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trello: TrelloConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Validated Trello key/token pair.
#[derive(Clone)]
pub struct TrelloCredentials {
    pub api_key: String,
    pub token: String,
}

impl fmt::Debug for TrelloCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrelloCredentials")
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

fn default_trello_base_url() -> String {
    "https://api.trello.com".into()
}
fn default_webhook_env() -> String {
    ENV_CHAT_WEBHOOK_URL.into()
}
fn default_board_id() -> String {
    "AQJCiqwE".into()
}
fn default_title() -> String {
    "Focused Prospecting Cards created".into()
}
fn default_timezone() -> String {
    "America/Mexico_City".into()
}
fn default_export_boards() -> Vec<BoardRef> {
    vec![
        BoardRef {
            id: "vkpjS0Dm".into(),
            name: "Board 1".into(),
        },
        BoardRef {
            id: "AQJCiqwE".into(),
            name: "Board 2".into(),
        },
    ]
}
fn default_export_output() -> PathBuf {
    PathBuf::from("cards_export.csv")
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            token: None,
            base_url: default_trello_base_url(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_env: default_webhook_env(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            board_id: default_board_id(),
            title: default_title(),
            timezone: default_timezone(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            boards: default_export_boards(),
            output: default_export_output(),
        }
    }
}

impl Config {
    /// Default location: `~/.config/cardpulse/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cardpulse").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Overlay credential variables looked up through `lookup`
    /// (normally `std::env::var(..).ok()`).
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_TRELLO_API_KEY) {
            self.trello.api_key = Some(v);
        }
        if let Some(v) = lookup(ENV_TRELLO_TOKEN) {
            self.trello.token = Some(v);
        }
        if let Some(v) = lookup(self.chat.webhook_env.as_str()) {
            self.chat.webhook_url = Some(v);
        }
        self
    }

    pub fn trello_credentials(&self) -> Result<TrelloCredentials, ConfigError> {
        Ok(TrelloCredentials {
            api_key: required(&self.trello.api_key, ENV_TRELLO_API_KEY)?.to_string(),
            token: required(&self.trello.token, ENV_TRELLO_TOKEN)?.to_string(),
        })
    }

    pub fn webhook_url(&self) -> Result<&str, ConfigError> {
        required(&self.chat.webhook_url, &self.chat.webhook_env)
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.digest
            .timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "digest.timezone".into(),
                message: e.to_string(),
            })
    }
}

/// Empty or whitespace-only values count as missing.
fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}
