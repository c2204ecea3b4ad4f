//! Sticker conversion pipeline: classification, authorization, transient storage, download,
//! format conversion, status reporting and delivery.

pub mod authorizer;
pub mod classifier;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod handler;
pub mod orchestrator;
pub mod status;
pub mod storage;

pub use authorizer::Authorizer;
pub use classifier::classify;
pub use converter::{
    Converter, ConverterRouter, FfmpegGifConverter, LottieConverter, LottiePreset, WebpPngConverter,
};
pub use error::{ConversionError, ConversionStage, FetchError, PipelineError};
pub use fetcher::ResourceFetcher;
pub use handler::StickerHandler;
pub use orchestrator::{Outcome, PipelineOrchestrator, PipelineRun, RejectReason, Stage, Timeouts};
pub use status::{StatusMessage, StatusReporter, StatusState};
pub use storage::{KeyClaim, ResourceRole, TransientResource, TransientStore};
