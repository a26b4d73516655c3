use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::LocalTime},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `debug` or `enterprise_proxy=trace,info`
    pub level: String,
    /// Log to daily rotated files in this directory instead of stderr
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            directory: None,
            file_prefix: "enterprise_proxy".to_string(),
            max_files: 10,
        }
    }
}

impl LoggingConfig {
    /// Default config writing to the platform data directory, if there is one.
    pub fn in_data_dir() -> Option<Self> {
        let directory = dirs::data_dir()?.join("enterprise-proxy").join("logs");
        Some(Self { directory: Some(directory), ..Self::default() })
    }
}

/// Installs the global tracing subscriber.
///
/// The returned guard must be kept alive for file logging to flush.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log filter '{}'", config.level))?;
    let format = fmt::format().with_timer(LocalTime::rfc_3339());

    match &config.directory {
        Some(_) => {
            let (writer, guard) = file_writer(config)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false) // Disable ANSI colors
                .event_format(format.pretty())
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow!(e))
                .context("Failed to set global subscriber")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .event_format(format)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!(e))
                .context("Failed to set global subscriber")?;
            Ok(None)
        }
    }
}

fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let directory = config.directory.as_deref().context("No log directory configured")?;
    fs_err::create_dir_all(directory).context("Failed to create logs directory")?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(config.max_files)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(directory)
        .context("Failed to initialize file appender")?;
    Ok(tracing_appender::non_blocking(file_appender))
}
