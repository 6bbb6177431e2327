pub mod chat;
pub mod traits;
pub mod trello;

pub use chat::ChatWebhook;
pub use traits::{BoardReader, EventSource, OwnerResolver, Publisher};
pub use trello::TrelloClient;
