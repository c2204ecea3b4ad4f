//! Error types for the conversion pipeline.

use relay_core::{AttachmentKind, RelayError};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure while downloading a source file.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Download locator could not be resolved: {0}")]
    Locator(String),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}

/// Which part of the conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    /// The converter could not be started or reported failure.
    Transform,
    /// The converter finished but the output file is missing or empty.
    Output,
    Timeout,
}

/// External transform failed or produced no output.
#[derive(Error, Debug)]
#[error("{kind} conversion failed at {stage:?}: {message}")]
pub struct ConversionError {
    pub stage: ConversionStage,
    pub kind: AttachmentKind,
    pub message: String,
}

impl ConversionError {
    pub fn new(stage: ConversionStage, kind: AttachmentKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }
}

/// Terminal error of one pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No supported attachment")]
    ClassificationNone,

    #[error("{0} conversion is restricted to approved users")]
    AuthorizationDenied(AttachmentKind),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Status message failed: {0}")]
    Status(String),

    #[error("Timed out during {stage}")]
    Timeout { stage: &'static str },

    #[error("Transport error: {0}")]
    Transport(#[from] RelayError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Bounds one step with `limit`; elapsing maps to [`PipelineError::Timeout`].
pub(crate) async fn within<T, E, F>(stage: &'static str, limit: Duration, step: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<PipelineError>,
{
    match tokio::time::timeout(limit, step).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(PipelineError::Timeout { stage }),
    }
}
