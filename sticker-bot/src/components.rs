//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use relay_core::Bot;
use relay_telegram::TelegramBotAdapter;
use std::sync::Arc;
use sticker_pipeline::{
    Authorizer, ConverterRouter, FfmpegGifConverter, LottieConverter, LottiePreset,
    PipelineOrchestrator, ResourceFetcher, StickerHandler, Timeouts, TransientStore,
    WebpPngConverter,
};
use tracing::{info, instrument};

use crate::config::{BotConfig, PipelineConfig};
use crate::handlers::{CommandHandler, LoggingHandler};

/// Core dependencies for run_bot; produced by the component factory.
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    pub bot: Arc<dyn Bot>,
    pub store: Arc<TransientStore>,
    pub orchestrator: Arc<PipelineOrchestrator>,
}

/// Converter strategies wired to the configured programs.
pub fn build_router(config: &PipelineConfig, store: Arc<TransientStore>) -> ConverterRouter {
    let preset = LottiePreset::select(config.tgs_compress);
    info!(
        ffmpeg = %config.ffmpeg_path,
        lottie = %config.lottie_command,
        ?preset,
        "Configured converters"
    );
    ConverterRouter::new(
        store,
        Arc::new(WebpPngConverter::new()),
        Arc::new(LottieConverter::new(config.lottie_command.clone(), preset)),
        Arc::new(FfmpegGifConverter::new(config.ffmpeg_path.clone())),
        config.convert_timeout(),
    )
}

/// Builds the orchestrator around `bot`. Prepares the working directory first.
#[instrument(skip(config, bot))]
pub async fn build_pipeline(
    config: &PipelineConfig,
    bot: Arc<dyn Bot>,
) -> Result<(Arc<TransientStore>, Arc<PipelineOrchestrator>)> {
    let store = Arc::new(TransientStore::new(&config.work_dir));
    store
        .prepare()
        .await
        .with_context(|| format!("Failed to prepare WORK_DIR {}", config.work_dir.display()))?;

    let allowlist = config.load_allowlist()?;
    info!(allowed_users = allowlist.len(), "Loaded animated-sticker allow-list");
    let authorizer = Arc::new(Authorizer::new(allowlist));

    let fetcher = Arc::new(
        ResourceFetcher::new(config.step_timeout(), config.fetch_proxy.as_deref())
            .context("Failed to build download client")?,
    );
    let router = Arc::new(build_router(config, store.clone()));

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        bot,
        authorizer,
        store.clone(),
        fetcher,
        router,
        Timeouts {
            step: config.step_timeout(),
        },
    ));
    Ok((store, orchestrator))
}

/// Builds BotComponents: teloxide bot, its `Bot` adapter, and the pipeline.
#[instrument(skip(config))]
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let teloxide_bot = config.base().telegram().build_bot();
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let (store, orchestrator) = build_pipeline(config.pipeline(), bot.clone()).await?;
    Ok(BotComponents {
        teloxide_bot,
        bot,
        store,
        orchestrator,
    })
}

/// Builds the handler chain (logging → commands → sticker pipeline).
pub fn build_handler_chain(bot: Arc<dyn Bot>, orchestrator: Arc<PipelineOrchestrator>) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(CommandHandler::new(bot)))
        .add_handler(Arc::new(StickerHandler::new(orchestrator)))
}
