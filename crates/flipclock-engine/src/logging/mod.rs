//! Logging utilities.
//!
//! Crates log through the `log` facade; binaries install the `env_logger`
//! backend once via [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
