//! File logging setup.
//!
//! The register owns the terminal while it runs, so diagnostics go to
//! `${BUNSIK_HOME}/logs/bunsik.log` instead of stderr. Filtering follows
//! the `BUNSIK_LOG` environment variable (RUST_LOG syntax), defaulting
//! to `info`.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

const LOG_FILE: &str = "bunsik.log";

/// Initializes the global subscriber writing to the log file.
///
/// The returned guard flushes buffered lines when dropped; hold it for
/// the lifetime of the process.
pub fn init() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("BUNSIK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
