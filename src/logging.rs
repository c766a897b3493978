use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, SyncError};

/// Initializes console logging, plus a daily rolling JSON log when `log_dir` is set.
///
/// The returned guard flushes the file writer on drop; keep it alive until exit.
/// An unusable log directory is reported before any subscriber is installed.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Respect RUST_LOG if set; otherwise info for our crate
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gs_sync=info,warn"));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = rolling_appender(dir)?;
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

fn rolling_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir).map_err(|e| {
        SyncError::Config(format!("cannot create log directory {}: {}", dir.display(), e))
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("gs_sync")
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| SyncError::Config(format!("cannot open log file in {}: {}", dir.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unusable_log_dir_is_a_config_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        match init_logging(Some(&blocker.join("logs"))) {
            Err(SyncError::Config(message)) => assert!(message.contains("log directory")),
            other => panic!("expected Config error, got {:?}", other.map(|g| g.is_some())),
        }
    }

    #[test]
    fn test_rolling_appender_creates_dir() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs").join("sync");

        assert!(rolling_appender(&logs).is_ok());
        assert!(logs.is_dir());
    }
}
