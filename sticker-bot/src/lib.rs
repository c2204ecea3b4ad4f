//! # sticker-bot
//!
//! Telegram bot that answers stickers, video stickers and GIFs with the same media as a
//! downloadable file. Config from env, handler chain from [`components`], REPL from `relay-telegram`.

pub mod cli;
pub mod components;
pub mod config;
pub mod handlers;
pub mod runner;

pub use cli::{convert_file, load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, build_pipeline, BotComponents};
pub use config::{BaseConfig, BotConfig, PipelineConfig};
pub use handlers::{CommandHandler, LoggingHandler, HELP_TEXT};
pub use runner::run_bot;
