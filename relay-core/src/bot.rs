//! Bot abstraction for the outbound side of the relay.
//!
//! [`Bot`] is transport-agnostic; `relay-telegram` implements it via teloxide and tests substitute
//! recording mocks. Message ids are transport-specific strings (Telegram uses numeric ids).

use crate::error::{RelayError, Result};
use crate::types::{Chat, OutboundDocument};
use async_trait::async_trait;

/// Outbound calls the pipeline makes against the chat transport.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends `text` as a reply to `reply_to` in `chat` and returns the new message id.
    async fn reply_to(&self, chat: &Chat, reply_to: &str, text: &str) -> Result<String>;
    /// Edits an already-sent message.
    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()>;
    /// Deletes a message.
    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()>;
    /// Uploads a local file as a document with an explicit file name.
    async fn send_document(&self, chat: &Chat, document: &OutboundDocument) -> Result<()>;
    /// Resolves a file id to a time-limited download URL.
    async fn file_download_url(&self, file_id: &str) -> Result<String>;
}

/// Parses a message id string into an i32. Used by edit, delete and reply.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| RelayError::Bot(format!("Invalid message_id: {}", s)))
}
