//! Logging setup for tidycsv
//!
//! Logs go to the console and to daily rolling files in the platform data
//! directory. The cleaning log returned to callers is separate from this: each
//! of its lines is also emitted as a `tracing` event, so the files keep a
//! history of past runs.
//!
//! ## Usage
//!
//! ```no_run
//! tidycsv::logging::init().expect("Failed to initialize logging");
//! tracing::info!("ready");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Directory name used under the platform data and config dirs.
pub const APP_DIR_NAME: &str = "tidycsv";

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/tidycsv/logs`
/// - macOS: `~/Library/Application Support/tidycsv/logs`
/// - Linux: `~/.local/share/tidycsv/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;

    let log_dir = base_dir.join(APP_DIR_NAME).join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Initializes console and file logging.
///
/// Creates two daily-rotated files, keeping 10 of each:
/// - `tidycsv.log`: everything that passes the env filter
/// - `error.log`: warnings and errors only
///
/// Files default to `info`. The console layer writes to stderr and defaults
/// to `warn`, leaving stdout to the cleaning log. `RUST_LOG` overrides both.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or an appender fails
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(APP_DIR_NAME)
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create error-logs file appender")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .init();

    tracing::debug!("Logging initialized, log directory: {}", log_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_under_app_dir() {
        let Ok(log_dir) = get_log_dir() else {
            // No data directory in this environment (e.g. no HOME)
            return;
        };
        assert!(log_dir.ends_with(PathBuf::from(APP_DIR_NAME).join("logs")));
        assert!(log_dir.is_dir());
    }
}
