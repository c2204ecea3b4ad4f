//! The per-run status message: created once, edited as the run progresses, deleted exactly once.

use crate::error::{within, PipelineError, Result};
use relay_core::{Bot, Chat};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusState {
    Created,
    Editing,
    Retired,
}

/// Handle to a live status message. Consumed by [`StatusReporter::retire`], so it can be
/// retired at most once.
#[derive(Debug)]
pub struct StatusMessage {
    chat: Chat,
    message_id: String,
    state: StatusState,
}

impl StatusMessage {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn state(&self) -> StatusState {
        self.state
    }
}

pub struct StatusReporter {
    bot: Arc<dyn Bot>,
    timeout: Duration,
}

impl StatusReporter {
    pub fn new(bot: Arc<dyn Bot>, timeout: Duration) -> Self {
        Self { bot, timeout }
    }

    /// Replies to `origin_message_id` with `text`.
    pub async fn create(&self, chat: &Chat, origin_message_id: &str, text: &str) -> Result<StatusMessage> {
        let message_id = within(
            "status create",
            self.timeout,
            self.bot.reply_to(chat, origin_message_id, text),
        )
        .await
        .map_err(status_error)?;
        debug!(message_id = %message_id, text, "Status message created");
        Ok(StatusMessage {
            chat: chat.clone(),
            message_id,
            state: StatusState::Created,
        })
    }

    pub async fn update(&self, status: &mut StatusMessage, text: &str) -> Result<()> {
        within(
            "status update",
            self.timeout,
            self.bot.edit_message(&status.chat, &status.message_id, text),
        )
        .await
        .map_err(status_error)?;
        status.state = StatusState::Editing;
        debug!(message_id = %status.message_id, text, "Status message updated");
        Ok(())
    }

    /// Deletes the status message. The handle is consumed whether or not the deletion succeeds.
    pub async fn retire(&self, mut status: StatusMessage) -> Result<()> {
        status.state = StatusState::Retired;
        let result = within(
            "status retire",
            self.timeout,
            self.bot.delete_message(&status.chat, &status.message_id),
        )
        .await
        .map_err(status_error);
        if let Err(e) = &result {
            warn!(message_id = %status.message_id, error = %e, "Could not delete status message");
        }
        result
    }
}

fn status_error(e: PipelineError) -> PipelineError {
    match e {
        PipelineError::Transport(inner) => PipelineError::Status(inner.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay_core::{OutboundDocument, RelayError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StatusBot {
        log: Mutex<Vec<String>>,
        slow_delete: bool,
    }

    #[async_trait]
    impl Bot for StatusBot {
        async fn reply_to(&self, _chat: &Chat, reply_to: &str, text: &str) -> relay_core::Result<String> {
            self.log.lock().unwrap().push(format!("reply {} {}", reply_to, text));
            Ok("55".to_string())
        }

        async fn edit_message(&self, _chat: &Chat, message_id: &str, text: &str) -> relay_core::Result<()> {
            self.log.lock().unwrap().push(format!("edit {} {}", message_id, text));
            Ok(())
        }

        async fn delete_message(&self, _chat: &Chat, message_id: &str) -> relay_core::Result<()> {
            if self.slow_delete {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.log.lock().unwrap().push(format!("delete {}", message_id));
            Ok(())
        }

        async fn send_document(&self, _chat: &Chat, _document: &OutboundDocument) -> relay_core::Result<()> {
            Err(RelayError::Bot("unused".to_string()))
        }

        async fn file_download_url(&self, _file_id: &str) -> relay_core::Result<String> {
            Err(RelayError::Bot("unused".to_string()))
        }
    }

    fn chat() -> Chat {
        Chat {
            id: 1,
            chat_type: "private".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_update_retire() {
        let bot = Arc::new(StatusBot::default());
        let reporter = StatusReporter::new(bot.clone(), Duration::from_secs(1));

        let mut status = reporter.create(&chat(), "9", "Processing...").await.unwrap();
        assert_eq!(status.message_id(), "55");
        assert_eq!(status.state(), StatusState::Created);

        reporter.update(&mut status, "Sending...").await.unwrap();
        assert_eq!(status.state(), StatusState::Editing);

        reporter.retire(status).await.unwrap();
        assert_eq!(
            *bot.log.lock().unwrap(),
            vec!["reply 9 Processing...", "edit 55 Sending...", "delete 55"]
        );
    }

    #[tokio::test]
    async fn test_retire_times_out() {
        let bot = Arc::new(StatusBot {
            slow_delete: true,
            ..StatusBot::default()
        });
        let reporter = StatusReporter::new(bot, Duration::from_millis(50));
        let status = reporter.create(&chat(), "9", "Processing...").await.unwrap();

        let err = reporter.retire(status).await.unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { stage: "status retire" }));
    }
}
