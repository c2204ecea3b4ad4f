//! Bot configuration: BaseConfig (Telegram + log) + PipelineConfig (storage, allow-list, converters, limits).

mod base;
mod bot_config;
mod pipeline;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use pipeline::PipelineConfig;
