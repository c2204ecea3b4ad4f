//! REPL runner: converts teloxide messages to [`relay_core::InboundRequest`] and passes each one to
//! the [`HandlerChain`] in its own task. A semaphore bounds how many chains run at once.

use anyhow::Result;
use handler_chain::HandlerChain;
use relay_core::ToInboundRequest;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;

/// Starts the REPL with the given teloxide Bot and HandlerChain.
///
/// Each message is spawned as an independent task; the task waits for one of `max_concurrent`
/// permits before running the chain so a burst of updates cannot start unbounded conversions.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    max_concurrent: usize,
) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(username = ?me.user.username, "Bot identity resolved"),
        Err(e) => warn!(error = %e, "get_me failed; continuing"),
    }

    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();
        let permits = permits.clone();

        async move {
            let request = TelegramMessageWrapper(&msg).to_inbound();
            info!(
                user_id = request.user.id,
                chat_id = request.chat.id,
                message_id = %request.id,
                has_sticker = request.sticker.is_some(),
                has_clip = request.clip.is_some(),
                "Received message"
            );

            // Run the chain in a spawned task so the REPL returns immediately
            tokio::spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(p) => p,
                    Err(e) => {
                        error!(error = %e, "Admission semaphore closed");
                        return;
                    }
                };
                if let Err(e) = chain.handle(&request).await {
                    error!(error = %e, user_id = request.user.id, "Handler chain failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
