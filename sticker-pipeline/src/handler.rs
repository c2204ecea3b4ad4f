//! Chain entry point for conversions.

use crate::error::PipelineError;
use crate::orchestrator::{Outcome, PipelineOrchestrator};
use async_trait::async_trait;
use relay_core::{Handler, HandlerResponse, InboundRequest, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the pipeline for every request that reaches it and stops the chain.
pub struct StickerHandler {
    orchestrator: Arc<PipelineOrchestrator>,
}

impl StickerHandler {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Handler for StickerHandler {
    async fn handle(&self, request: &InboundRequest) -> Result<HandlerResponse> {
        let run = self.orchestrator.execute(request).await;
        match &run.outcome {
            Outcome::Delivered { file_name } => {
                info!(run_id = %run.run_id, file_name = %file_name, "Sticker delivered")
            }
            Outcome::Rejected(reason) => {
                info!(run_id = %run.run_id, reason = %PipelineError::from(*reason), "Request rejected")
            }
            Outcome::Failed(e) => warn!(run_id = %run.run_id, error = %e, stages = ?run.stages, "Request failed"),
        }
        Ok(HandlerResponse::Stop)
    }
}
