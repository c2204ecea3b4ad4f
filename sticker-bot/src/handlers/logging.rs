//! Logs each request in before() and the chain result in after(); always continues.

use async_trait::async_trait;
use relay_core::{Handler, HandlerResponse, InboundRequest, Result};
use tracing::{debug, info, instrument};

pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, request))]
    async fn before(&self, request: &InboundRequest) -> Result<bool> {
        info!(
            user_id = request.user.id,
            username = %request.user.username.as_deref().unwrap_or("unknown"),
            chat_id = request.chat.id,
            message_id = %request.id,
            text = %request.text.as_deref().unwrap_or(""),
            has_sticker = request.sticker.is_some(),
            has_clip = request.clip.is_some(),
            "Received request"
        );
        Ok(true)
    }

    #[instrument(skip(self, request, response))]
    async fn after(&self, request: &InboundRequest, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = %request.id,
            response = ?response,
            "Processed request"
        );
        Ok(())
    }
}
