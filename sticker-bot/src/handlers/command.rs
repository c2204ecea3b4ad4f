//! Answers `/start` and `/help`; everything else passes through to the next handler.

use async_trait::async_trait;
use relay_core::{Bot, Handler, HandlerResponse, InboundRequest, Result};
use std::sync::Arc;
use tracing::info;

pub const HELP_TEXT: &str = "This bot is used for download all kinds of stickers.\n\
Send a sticker, a video sticker or a GIF and it comes back as a file:\n\
static stickers as PNG, animated and video stickers and GIFs as GIF.";

pub struct CommandHandler {
    bot: Arc<dyn Bot>,
}

impl CommandHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

/// `/help@my_bot args` → `help`.
fn command_name(text: &str) -> Option<&str> {
    let first = text.trim_start().split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    Some(name.split('@').next().unwrap_or(name))
}

#[async_trait]
impl Handler for CommandHandler {
    async fn handle(&self, request: &InboundRequest) -> Result<HandlerResponse> {
        if request.sticker.is_some() || request.clip.is_some() {
            return Ok(HandlerResponse::Continue);
        }
        match request.text.as_deref().and_then(command_name) {
            Some("start") | Some("help") => {
                info!(user_id = request.user.id, "Answering help command");
                self.bot
                    .reply_to(&request.chat, &request.id, HELP_TEXT)
                    .await?;
                Ok(HandlerResponse::Stop)
            }
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
