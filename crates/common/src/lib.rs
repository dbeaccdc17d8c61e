pub mod config;
mod datetime;
mod logging;
mod tasks;
mod testing;
pub mod types;

pub use config::{ApprovalMode, Config, ConfigError};
pub use datetime::*;
pub use logging::*;
pub use tasks::*;
pub use testing::{init_logger as init_test_logger, test_dir};
