//! Print bridge host
//!
//! Runs the print bridge outside a browser: configuration from the
//! environment, logging to stderr, native channel payloads on stdout for
//! the embedded app shell, and an HTML page file as the fallback print view.
//!
//! ```text
//! print-bridge-host/src/
//! ├── app.rs      # adapter wiring, command execution
//! ├── cli.rs      # command line
//! ├── config.rs   # environment configuration
//! └── logger.rs   # tracing setup
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod logger;

pub use app::{App, Outcome};
pub use cli::{Cli, Command};
pub use config::{ChannelMode, Config};
pub use logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, then initialize logging from the resulting configuration
pub fn setup_environment() -> anyhow::Result<Config> {
    // A missing .env file is fine
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )?;
    Ok(config)
}
