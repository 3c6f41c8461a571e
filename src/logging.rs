//! Log output for the dashboard binary.
//!
//! The terminal belongs to the dashboard, so logs only ever go to a file.
//! Without a log file no subscriber is installed and `tracing` calls are no-ops.

use crate::error::{MonitorError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::{prelude::*, registry};

const DEFAULT_FILE_NAME: &str = "machines-monitor.log";

/// Installs the global subscriber writing to `path`.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Keep the returned
/// guard alive for as long as logs should be flushed.
///
/// # Errors
///
/// Returns [`MonitorError::Logging`] if the file cannot be opened or a global
/// subscriber is already installed.
pub fn init(path: &Path) -> Result<WorkerGuard> {
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map_or_else(|| DEFAULT_FILE_NAME.to_string(), |n| n.to_string_lossy().into_owned());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| MonitorError::Logging(e.to_string()))?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let file_layer = layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_filter(env_filter);

    registry().with(file_layer).try_init().map_err(|e| MonitorError::Logging(e.to_string()))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");

        let guard = init(&path).unwrap();
        tracing::info!("hello from test");
        drop(guard);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello from test"), "{content}");
    }
}
