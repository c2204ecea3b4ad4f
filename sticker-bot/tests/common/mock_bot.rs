//! Mock implementation of [`relay_core::Bot`] for chain tests.
//!
//! Records replies so tests can assert on what the user would see without hitting Telegram.

use async_trait::async_trait;
use relay_core::{Bot, Chat, OutboundDocument, RelayError, Result};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockBot {
    replies: Mutex<Vec<(String, String)>>,
    resolved: Mutex<Vec<String>>,
}

impl MockBot {
    /// `(reply_to, text)` pairs in call order.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn resolved(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn reply_to(&self, _chat: &Chat, reply_to: &str, text: &str) -> Result<String> {
        let mut replies = self.replies.lock().unwrap();
        replies.push((reply_to.to_string(), text.to_string()));
        Ok(format!("{}", 1000 + replies.len()))
    }

    async fn edit_message(&self, _chat: &Chat, _message_id: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat: &Chat, _message_id: &str) -> Result<()> {
        Ok(())
    }

    async fn send_document(&self, _chat: &Chat, _document: &OutboundDocument) -> Result<()> {
        Ok(())
    }

    async fn file_download_url(&self, file_id: &str) -> Result<String> {
        self.resolved.lock().unwrap().push(file_id.to_string());
        Err(RelayError::Bot("downloads are not available in chain tests".to_string()))
    }
}
