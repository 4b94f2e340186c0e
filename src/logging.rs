use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, ScraperError};

/// Daily rolling appender in `dir`, creating the directory if needed.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir).map_err(|e| {
        ScraperError::Logging(format!(
            "Failed to create log directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("nuliga_calendar.log")
        .build(dir)
        .map_err(|e| {
            ScraperError::Logging(format!(
                "Failed to open log file in '{}': {}",
                dir.display(),
                e
            ))
        })
}

/// Initializes console logging on stderr, plus JSON file output when a log directory is given.
///
/// Stdout is left free for the final summary line.
pub fn init_logging(log_dir: Option<&Path>) -> Result<()> {
    // Respect RUST_LOG if set; otherwise info for our crate and warnings from dependencies
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nuliga_calendar=info,warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file_layer = match log_dir {
        Some(dir) => {
            let appender = file_appender(dir)?;
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(appender);

            // The guard flushes on drop; the process is short-lived, so keep it for its lifetime
            std::mem::forget(guard);

            Some(fmt::layer().json().with_writer(non_blocking_writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_appender_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("logs").join("nested");
        assert!(file_appender(&dir).is_ok());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_file_appender_under_regular_file_is_error() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let err = file_appender(&blocker.join("logs")).unwrap_err();
        assert!(matches!(err, ScraperError::Logging(_)));
        assert!(err.to_string().contains("Failed to create log directory"));
    }
}
