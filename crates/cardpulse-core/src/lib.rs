//! # cardpulse Core Library
//!
//! Business logic for the cardpulse board digest. Everything the CLI does is
//! available here; the binary only parses arguments, builds the
//! [`Config`] and wires the integrations together.
//!
//! ## Architecture
//!
//! - **Window**: one local calendar day as a half-open UTC interval
//! - **Integrations**: Trello (creation events, card owners, open cards) and
//!   a chat webhook, behind small async traits
//! - **Owners / Aggregate / Format**: pure fallback, counting and rendering
//! - **Digest**: the sequential pipeline tying those together
//! - **Export**: CSV dump of open cards across boards
//!
//! ## Key Components
//!
//! - [`compute`]: reporting window for a mode and "now"
//! - [`resolve_owners`]: ordered owner fallback chain
//! - [`aggregate()`]: per-owner counts with optional allow-list
//! - [`run_digest`]: full pipeline, publishing once

pub mod aggregate;
pub mod board;
pub mod config;
pub mod digest;
pub mod error;
pub mod export;
pub mod format;
pub mod integrations;
pub mod owners;
pub mod window;

pub use aggregate::{aggregate, AllowList, CountTable};
pub use board::{Item, ItemId, LabelRef, MemberRef};
pub use config::{BoardRef, Config, TrelloCredentials};
pub use digest::{build_digest, run_digest, DigestReport, DigestRequest, SkippedItem};
pub use error::{ConfigError, DigestError, Result};
pub use export::ExportRow;
pub use format::SummaryMessage;
pub use owners::{resolve_owners, Owner, OwnerRule, UNASSIGNED};
pub use window::{compute, TimeWindow, WindowMode};
