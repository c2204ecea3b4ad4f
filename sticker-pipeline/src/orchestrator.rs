//! One conversion run per inbound request:
//! classify → authorize → status → fetch → convert → status → deliver → retire status → clean up.
//!
//! Every run that creates a status message retires it exactly once, and every transient file the
//! run created is gone when [`PipelineOrchestrator::execute`] returns.

use crate::authorizer::Authorizer;
use crate::classifier::classify;
use crate::converter::ConverterRouter;
use crate::error::{within, FetchError, PipelineError, Result};
use crate::fetcher::ResourceFetcher;
use crate::status::{StatusMessage, StatusReporter};
use crate::storage::{TransientResource, TransientStore};
use relay_core::{Attachment, AttachmentKind, Bot, InboundRequest, OutboundDocument};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub const PROMPT_TEXT: &str = "Please send a sticker or gif to me.";
pub const DENIED_TEXT: &str = "Converting animated stickers is only available to approved users.";
pub const DECODING_TEXT: &str = "Decoding and Processing...";
pub const PROCESSING_TEXT: &str = "Processing...";
pub const SENDING_TEXT: &str = "Sending...";
pub const FAILURE_TEXT: &str = "Sorry, the conversion failed. Please try again later.";

/// Progress markers recorded in order for each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Classified,
    Rejected,
    Authorized,
    StatusCreated,
    Fetched,
    Converted,
    StatusUpdated,
    Delivered,
    StatusRetired,
    Cleaned,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoAttachment,
    Unauthorized(AttachmentKind),
}

impl From<RejectReason> for PipelineError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::NoAttachment => PipelineError::ClassificationNone,
            RejectReason::Unauthorized(kind) => PipelineError::AuthorizationDenied(kind),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Delivered { file_name: String },
    Rejected(RejectReason),
    Failed(PipelineError),
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Record of one run: its id, the stages reached, and the terminal outcome.
#[derive(Debug)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub attachment: Option<Attachment>,
    pub stages: Vec<Stage>,
    pub outcome: Outcome,
}

impl PipelineRun {
    pub fn reached(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.stages.iter().filter(|s| **s == stage).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Bound on each chat call, download-link resolution, download, and upload.
    pub step: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(30),
        }
    }
}

/// Files a run has created; released together at the end of the run.
#[derive(Default)]
struct RunFiles {
    source: Option<TransientResource>,
    output: Option<TransientResource>,
}

impl RunFiles {
    async fn release(self) {
        for resource in [self.source, self.output].into_iter().flatten() {
            let path = resource.path().to_path_buf();
            if let Err(e) = resource.release().await {
                warn!(path = %path.display(), error = %e, "Could not remove transient file");
            }
        }
    }
}

pub struct PipelineOrchestrator {
    bot: Arc<dyn Bot>,
    authorizer: Arc<Authorizer>,
    store: Arc<TransientStore>,
    fetcher: Arc<ResourceFetcher>,
    router: Arc<ConverterRouter>,
    status: StatusReporter,
    timeouts: Timeouts,
}

impl PipelineOrchestrator {
    pub fn new(
        bot: Arc<dyn Bot>,
        authorizer: Arc<Authorizer>,
        store: Arc<TransientStore>,
        fetcher: Arc<ResourceFetcher>,
        router: Arc<ConverterRouter>,
        timeouts: Timeouts,
    ) -> Self {
        let status = StatusReporter::new(bot.clone(), timeouts.step);
        Self {
            bot,
            authorizer,
            store,
            fetcher,
            router,
            status,
            timeouts,
        }
    }

    /// Runs the pipeline and returns only the outcome.
    pub async fn run(&self, request: &InboundRequest) -> Outcome {
        self.execute(request).await.outcome
    }

    #[instrument(skip(self, request), fields(run_id = tracing::field::Empty, user_id = request.user.id, message_id = %request.id))]
    pub async fn execute(&self, request: &InboundRequest) -> PipelineRun {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let mut stages = vec![Stage::Received];

        let Some(attachment) = classify(request) else {
            stages.push(Stage::Rejected);
            info!("No convertible attachment; sending prompt");
            self.reply_quietly(request, PROMPT_TEXT).await;
            return PipelineRun {
                run_id,
                attachment: None,
                stages,
                outcome: Outcome::Rejected(RejectReason::NoAttachment),
            };
        };
        stages.push(Stage::Classified);
        let kind = attachment.kind();
        info!(kind = %kind, key = %attachment.storage_key(), "Attachment classified");

        if !self.authorizer.permits(request.user.id, &attachment) {
            stages.push(Stage::Rejected);
            self.reply_quietly(request, DENIED_TEXT).await;
            return PipelineRun {
                run_id,
                attachment: Some(attachment),
                stages,
                outcome: Outcome::Rejected(RejectReason::Unauthorized(kind)),
            };
        }
        stages.push(Stage::Authorized);

        let claim = self.store.claim(&attachment.storage_key()).await;

        let initial = if kind == AttachmentKind::AnimatedSticker {
            DECODING_TEXT
        } else {
            PROCESSING_TEXT
        };
        let mut status = match self.status.create(&request.chat, &request.id, initial).await {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "Could not create status message");
                stages.push(Stage::Failed);
                return PipelineRun {
                    run_id,
                    attachment: Some(attachment),
                    stages,
                    outcome: Outcome::Failed(e),
                };
            }
        };
        stages.push(Stage::StatusCreated);

        let mut files = RunFiles::default();
        let delivered = self
            .process(request, &attachment, &mut status, &mut files, &mut stages)
            .await;
        if let Err(e) = &delivered {
            error!(error = %e, kind = %kind, "Conversion run failed");
            stages.push(Stage::Failed);
        }

        // Retired exactly once on every path past StatusCreated; a failed delete is only logged.
        let _ = self.status.retire(status).await;
        stages.push(Stage::StatusRetired);

        if delivered.is_err() {
            self.reply_quietly(request, FAILURE_TEXT).await;
        }

        files.release().await;
        stages.push(Stage::Cleaned);
        drop(claim);

        let outcome = match delivered {
            Ok(file_name) => {
                info!(file_name = %file_name, "Run delivered");
                Outcome::Delivered { file_name }
            }
            Err(e) => Outcome::Failed(e),
        };
        PipelineRun {
            run_id,
            attachment: Some(attachment),
            stages,
            outcome,
        }
    }

    async fn process(
        &self,
        request: &InboundRequest,
        attachment: &Attachment,
        status: &mut StatusMessage,
        files: &mut RunFiles,
        stages: &mut Vec<Stage>,
    ) -> Result<String> {
        let file_id = &attachment.file().file_id;
        let locator = within(
            "download link",
            self.timeouts.step,
            self.bot.file_download_url(file_id),
        )
        .await
        .map_err(|e| match e {
            PipelineError::Transport(inner) => FetchError::Locator(inner.to_string()).into(),
            other => other,
        })?;

        let destination = self.store.source_path(attachment);
        let source = within(
            "download",
            self.timeouts.step,
            self.fetcher.fetch(&locator, &destination),
        )
        .await?;
        let source = files.source.insert(source);
        stages.push(Stage::Fetched);

        let output = self.router.convert(source, attachment).await?;
        let output = files.output.insert(output);
        stages.push(Stage::Converted);

        match self.status.update(status, SENDING_TEXT).await {
            Ok(()) => stages.push(Stage::StatusUpdated),
            Err(e) => warn!(error = %e, "Could not update status message; continuing"),
        }

        let document = OutboundDocument {
            path: output.path().to_path_buf(),
            file_name: attachment.output_filename(),
            content_type: attachment.kind().content_type().map(str::to_string),
            reply_to: Some(request.id.clone()),
        };
        within(
            "upload",
            self.timeouts.step,
            self.bot.send_document(&request.chat, &document),
        )
        .await
        .map_err(|e| match e {
            PipelineError::Transport(inner) => PipelineError::Delivery(inner.to_string()),
            other => other,
        })?;
        stages.push(Stage::Delivered);
        Ok(document.file_name)
    }

    async fn reply_quietly(&self, request: &InboundRequest, text: &str) {
        let sent = within(
            "reply",
            self.timeouts.step,
            self.bot.reply_to(&request.chat, &request.id, text),
        )
        .await;
        if let Err(e) = sent {
            warn!(error = %e, "Could not send reply");
        }
    }
}
