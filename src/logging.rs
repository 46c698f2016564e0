use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "infinite-bookmarker.log";

/// Send logs to a file under `log_dir`; the prompts own the terminal.
///
/// `RUST_LOG` wins over `level`. Keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init_logging(log_dir: &Path, level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
