use anyhow::Result;
use relay_core::init_tracing;
use relay_telegram::run_repl;
use tracing::{info, instrument};

use super::components::{build_bot_components, build_handler_chain};
use super::config::BotConfig;

/// Main entry: validate config, init logging, build components and chain, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    let pipeline = config.pipeline();
    info!(
        work_dir = %pipeline.work_dir.display(),
        max_concurrent_runs = pipeline.max_concurrent_runs,
        step_timeout_secs = pipeline.step_timeout_secs,
        convert_timeout_secs = pipeline.convert_timeout_secs,
        tgs_compress = pipeline.tgs_compress,
        "Initializing bot"
    );

    let components = build_bot_components(&config).await?;
    let handler_chain =
        build_handler_chain(components.bot.clone(), components.orchestrator.clone());

    info!("Bot started successfully");

    run_repl(
        components.teloxide_bot,
        handler_chain,
        pipeline.max_concurrent_runs,
    )
    .await
}
