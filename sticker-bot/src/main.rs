//! Binary for the sticker bot: `run` starts the bot, `convert` converts a local file.

use anyhow::Result;
use clap::Parser;
use sticker_bot::{convert_file, load_config, run_bot, Cli, Commands, PipelineConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            run_bot(config).await
        }
        Commands::Convert {
            input,
            kind,
            output,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
                .with_target(false)
                .init();
            let config = PipelineConfig::from_env()?;
            let written = convert_file(&config, &input, kind, output).await?;
            println!("{}", written.display());
            Ok(())
        }
    }
}
