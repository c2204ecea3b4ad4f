//! Wraps teloxide::Bot and implements [`relay_core::Bot`]. Production code talks to Telegram; tests substitute another Bot impl.

use async_trait::async_trait;
use relay_core::{parse_message_id, Bot as CoreBot, Chat, OutboundDocument, RelayError, Result};
use teloxide::{
    prelude::*,
    types::{ChatId, FileId, InputFile, MessageId, ReplyParameters},
};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements relay-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

/// Builds `{api_url}/file/bot{token}/{file_path}`, the Bot API download location of a file.
pub fn file_download_url(api_url: &str, token: &str, file_path: &str) -> String {
    format!(
        "{}/file/bot{}/{}",
        api_url.trim_end_matches('/'),
        token,
        file_path.trim_start_matches('/')
    )
}

fn bot_err(e: impl std::fmt::Display) -> RelayError {
    RelayError::Bot(e.to_string())
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn reply_to(&self, chat: &Chat, reply_to: &str, text: &str) -> Result<String> {
        let reply_id = parse_message_id(reply_to)?;
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .reply_parameters(ReplyParameters::new(MessageId(reply_id)))
            .await
            .map_err(bot_err)?;
        Ok(sent.id.0.to_string())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .edit_message_text(ChatId(chat.id), MessageId(id), text)
            .await
            .map_err(bot_err)?;
        Ok(())
    }

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .delete_message(ChatId(chat.id), MessageId(id))
            .await
            .map_err(bot_err)?;
        Ok(())
    }

    async fn send_document(&self, chat: &Chat, document: &OutboundDocument) -> Result<()> {
        // Telegram derives the MIME type from the file name; content_type is informational here.
        debug!(
            chat_id = chat.id,
            file_name = %document.file_name,
            content_type = ?document.content_type,
            "Uploading document"
        );
        let input = InputFile::file(document.path.clone()).file_name(document.file_name.clone());
        let mut req = self.bot.send_document(ChatId(chat.id), input);
        if let Some(reply_to) = &document.reply_to {
            req = req.reply_parameters(ReplyParameters::new(MessageId(parse_message_id(reply_to)?)));
        }
        req.await.map_err(bot_err)?;
        Ok(())
    }

    async fn file_download_url(&self, file_id: &str) -> Result<String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(bot_err)?;
        Ok(file_download_url(
            self.bot.api_url().as_str(),
            self.bot.token(),
            &file.path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_download_url() {
        assert_eq!(
            file_download_url("https://api.telegram.org/", "123:abc", "stickers/file_1.tgs"),
            "https://api.telegram.org/file/bot123:abc/stickers/file_1.tgs"
        );
        assert_eq!(
            file_download_url("http://localhost:8081", "t", "/a.webp"),
            "http://localhost:8081/file/bott/a.webp"
        );
    }
}
