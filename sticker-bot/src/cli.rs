//! CLI parser, config loading, and the offline `convert` command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_core::AttachmentKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sticker_pipeline::TransientStore;
use tracing::{info, warn};

use crate::components::build_router;
use crate::config::{BotConfig, PipelineConfig};

#[derive(Parser)]
#[command(name = "sticker-bot")]
#[command(about = "Telegram bot that returns stickers and GIFs as files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Convert a local file with the same converters the bot uses.
    Convert {
        input: PathBuf,
        /// static_sticker | animated_sticker | video_sticker | animation_clip (or webp | tgs | webm | mp4).
        #[arg(short, long)]
        kind: Option<AttachmentKind>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Load BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}

/// Kind inferred from the input extension when not given.
pub fn infer_kind(input: &Path) -> Result<AttachmentKind> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .with_context(|| format!("Cannot infer kind of {}; pass --kind", input.display()))?;
    ext.parse::<AttachmentKind>()
        .map_err(|e| anyhow::anyhow!("{}; pass --kind", e))
}

/// `{stem}.{ext}` next to the input, or `{stem}.converted.{ext}` when the input already has the
/// output extension.
pub fn default_output(input: &Path, kind: AttachmentKind) -> PathBuf {
    let ext = kind.output_extension();
    let same_ext = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if !same_ext {
        return input.with_extension(ext);
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{}.converted.{}", stem, ext))
}

async fn is_same_file(input: &Path, output: &Path) -> Result<bool> {
    if !tokio::fs::try_exists(output).await.unwrap_or(false) {
        return Ok(false);
    }
    let input = tokio::fs::canonicalize(input)
        .await
        .with_context(|| format!("Failed to resolve {}", input.display()))?;
    let output = tokio::fs::canonicalize(output)
        .await
        .with_context(|| format!("Failed to resolve {}", output.display()))?;
    Ok(input == output)
}

/// Converts `input` and returns the written output path. A failed conversion leaves no output, and
/// the input is never overwritten.
pub async fn convert_file(
    config: &PipelineConfig,
    input: &Path,
    kind: Option<AttachmentKind>,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    if !input.is_file() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let kind = match kind {
        Some(k) => k,
        None => infer_kind(input)?,
    };
    let output = output.unwrap_or_else(|| default_output(input, kind));
    if is_same_file(input, &output).await? {
        anyhow::bail!(
            "Output {} would overwrite the input; pass a different --output",
            output.display()
        );
    }

    let store = Arc::new(TransientStore::new(&config.work_dir));
    let router = build_router(config, store);
    match router.convert_file(kind, input, &output).await {
        Ok(bytes) => {
            info!(kind = %kind, output = %output.display(), bytes, "Converted");
            Ok(output)
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&output).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!(output = %output.display(), error = %rm, "Could not remove failed output");
                }
            }
            Err(e.into())
        }
    }
}
