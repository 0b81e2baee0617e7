//! Tracing setup.
//!
//! Logs go to a daily rolling file so stdout stays reserved for command
//! output. `--verbose` mirrors them to stderr.

use std::path::PathBuf;

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "TOSHL_LOG";

const MAX_LOG_FILES: usize = 7;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(config: &LogConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(&config.level))
    .map_err(|e| eyre!("Invalid log filter '{}': {}", config.level, e))?;

  let (file_layer, guard) = match log_dir() {
    Some(dir) => {
      std::fs::create_dir_all(&dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
      let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("toshl")
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&dir)
        .map_err(|e| eyre!("Failed to create log file in {}: {}", dir.display(), e))?;
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer().with_ansi(false).with_writer(writer);
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  let stderr_layer = verbose.then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));

  tracing_subscriber::registry()
    .with(filter)
    .with(file_layer)
    .with(stderr_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}

/// `<data_dir>/toshl-cli/logs`
fn log_dir() -> Option<PathBuf> {
  dirs::data_dir().map(|dir| dir.join("toshl-cli").join("logs"))
}
