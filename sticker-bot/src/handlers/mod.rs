//! Chain handlers owned by the application: command replies and request logging.

mod command;
mod logging;

pub use command::{CommandHandler, HELP_TEXT};
pub use logging::LoggingHandler;
