//! Mock implementation of [`relay_core::Bot`] for pipeline tests.
//!
//! Records every call in order so tests can assert on replies, status edits, deletions and
//! delivered documents without hitting Telegram.

use async_trait::async_trait;
use relay_core::{Bot, Chat, OutboundDocument, RelayError, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How long a stalled call hangs; longer than any step timeout used in tests.
const STALL: Duration = Duration::from_secs(30);

/// One recorded bot call.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)] // not every test file inspects every field
pub enum BotCall {
    Reply { reply_to: String, text: String, message_id: String },
    Edit { message_id: String, text: String },
    Delete { message_id: String },
    Document {
        file_name: String,
        content_type: Option<String>,
        reply_to: Option<String>,
        /// Bytes of the file at send time; `None` if it did not exist.
        contents: Option<Vec<u8>>,
    },
    Resolve { file_id: String },
}

pub struct MockBot {
    /// Base of the download URLs handed out by `file_download_url`.
    download_base: String,
    next_id: AtomicU64,
    calls: Mutex<Vec<BotCall>>,
    pub fail_document: AtomicBool,
    pub fail_status_reply: AtomicBool,
    pub stall_status_reply: AtomicBool,
    pub stall_resolve: AtomicBool,
    pub stall_document: AtomicBool,
}

impl MockBot {
    pub fn new(download_base: impl Into<String>) -> Self {
        Self {
            download_base: download_base.into(),
            next_id: AtomicU64::new(100),
            calls: Mutex::new(Vec::new()),
            fail_document: AtomicBool::new(false),
            fail_status_reply: AtomicBool::new(false),
            stall_status_reply: AtomicBool::new(false),
            stall_resolve: AtomicBool::new(false),
            stall_document: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<BotCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BotCall::Reply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BotCall::Delete { message_id } => Some(message_id),
                _ => None,
            })
            .collect()
    }

    pub fn documents(&self) -> Vec<BotCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, BotCall::Document { .. }))
            .collect()
    }

    fn record(&self, call: BotCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn reply_to(&self, _chat: &Chat, reply_to: &str, text: &str) -> Result<String> {
        let is_status = text.ends_with("...");
        if is_status && self.fail_status_reply.load(Ordering::SeqCst) {
            return Err(RelayError::Bot("reply rejected".to_string()));
        }
        if is_status && self.stall_status_reply.load(Ordering::SeqCst) {
            tokio::time::sleep(STALL).await;
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.record(BotCall::Reply {
            reply_to: reply_to.to_string(),
            text: text.to_string(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }

    async fn edit_message(&self, _chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        self.record(BotCall::Edit {
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, _chat: &Chat, message_id: &str) -> Result<()> {
        self.record(BotCall::Delete {
            message_id: message_id.to_string(),
        });
        Ok(())
    }

    async fn send_document(&self, _chat: &Chat, document: &OutboundDocument) -> Result<()> {
        if self.fail_document.load(Ordering::SeqCst) {
            return Err(RelayError::Bot("upload rejected".to_string()));
        }
        if self.stall_document.load(Ordering::SeqCst) {
            tokio::time::sleep(STALL).await;
        }
        self.record(BotCall::Document {
            file_name: document.file_name.clone(),
            content_type: document.content_type.clone(),
            reply_to: document.reply_to.clone(),
            contents: std::fs::read(&document.path).ok(),
        });
        Ok(())
    }

    async fn file_download_url(&self, file_id: &str) -> Result<String> {
        self.record(BotCall::Resolve {
            file_id: file_id.to_string(),
        });
        if self.stall_resolve.load(Ordering::SeqCst) {
            tokio::time::sleep(STALL).await;
        }
        Ok(format!("{}/files/{}", self.download_base, file_id))
    }
}
