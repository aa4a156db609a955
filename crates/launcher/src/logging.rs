//! Host logging: console (pretty or json) plus a daily rolling file

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "fether=info";
const HOST_LOG_FILE: &str = "fether.log";

/// Install the global subscriber
///
/// Keep the returned guard alive until exit, or buffered file lines are
/// lost.
pub fn init(format: LogFormat, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| anyhow!("Failed to create log dir {}: {}", log_dir.display(), e))?;

    let appender = tracing_appender::rolling::daily(log_dir, HOST_LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .json()
        .with_writer(file_writer);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter()?)
            .with(file_layer)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter()?)
            .with(file_layer)
            .with(fmt::layer().pretty())
            .try_init(),
    }
    .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

fn env_filter() -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| anyhow!("Invalid log filter: {}", e))
}
