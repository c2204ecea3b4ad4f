//! Format conversion. Each [`AttachmentKind`] maps to one [`Converter`] strategy; the
//! [`ConverterRouter`] supplies the paths, bounds the run with a timeout, and checks the output.

mod ffmpeg;
mod lottie;
mod webp;

pub use ffmpeg::FfmpegGifConverter;
pub use lottie::{LottieConverter, LottiePreset};
pub use webp::WebpPngConverter;

use crate::error::{ConversionError, ConversionStage};
use crate::storage::{ResourceRole, TransientResource, TransientStore};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use relay_core::{Attachment, AttachmentKind};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// One conversion strategy: reads `input`, writes `output`.
#[async_trait]
pub trait Converter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

pub struct ConverterRouter {
    store: Arc<TransientStore>,
    image: Arc<dyn Converter>,
    lottie: Arc<dyn Converter>,
    video: Arc<dyn Converter>,
    timeout: Duration,
}

impl ConverterRouter {
    pub fn new(
        store: Arc<TransientStore>,
        image: Arc<dyn Converter>,
        lottie: Arc<dyn Converter>,
        video: Arc<dyn Converter>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            image,
            lottie,
            video,
            timeout,
        }
    }

    /// StaticSticker → image, AnimatedSticker → lottie, VideoSticker and AnimationClip → video.
    pub fn strategy(&self, kind: AttachmentKind) -> &Arc<dyn Converter> {
        match kind {
            AttachmentKind::StaticSticker => &self.image,
            AttachmentKind::AnimatedSticker => &self.lottie,
            AttachmentKind::VideoSticker | AttachmentKind::AnimationClip => &self.video,
        }
    }

    /// Converts `source` into the output path of `attachment`. On success the output exists and is
    /// non-empty; on failure no output file is left behind.
    #[instrument(skip(self, source, attachment), fields(kind = %attachment.kind(), key = %attachment.storage_key()))]
    pub async fn convert(
        &self,
        source: &TransientResource,
        attachment: &Attachment,
    ) -> std::result::Result<TransientResource, ConversionError> {
        let output = TransientResource::new(self.store.output_path(attachment), ResourceRole::Output);
        if let Err(e) = self
            .convert_file(attachment.kind(), source.path(), output.path())
            .await
        {
            if let Err(release_err) = output.release().await {
                warn!(error = %release_err, "Could not remove partial output");
            }
            return Err(e);
        }
        Ok(output)
    }

    /// Runs the strategy for `kind` on arbitrary paths, bounded by the router timeout. Returns the
    /// size of the non-empty output.
    pub async fn convert_file(
        &self,
        kind: AttachmentKind,
        input: &Path,
        output: &Path,
    ) -> std::result::Result<u64, ConversionError> {
        let strategy = self.strategy(kind);
        match tokio::time::timeout(self.timeout, strategy.convert(input, output)).await {
            Err(_) => {
                warn!(converter = strategy.name(), timeout = ?self.timeout, "Conversion timed out");
                return Err(ConversionError::new(
                    ConversionStage::Timeout,
                    kind,
                    format!("{} exceeded {:?}", strategy.name(), self.timeout),
                ));
            }
            Ok(Err(e)) => {
                return Err(ConversionError::new(
                    ConversionStage::Transform,
                    kind,
                    format!("{}: {:#}", strategy.name(), e),
                ));
            }
            Ok(Ok(())) => {}
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => {
                info!(converter = strategy.name(), bytes = meta.len(), "Conversion finished");
                Ok(meta.len())
            }
            Ok(_) => Err(ConversionError::new(
                ConversionStage::Output,
                kind,
                format!("{} produced an empty file", strategy.name()),
            )),
            Err(e) => Err(ConversionError::new(
                ConversionStage::Output,
                kind,
                format!("{} produced no output: {}", strategy.name(), e),
            )),
        }
    }
}

/// Runs an external program to completion. The child is killed if the future is dropped.
pub(crate) async fn run_program(program: &str, args: &[String]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        ));
    }
    Ok(())
}
