//! Subscriber setup for the monitor
//!
//! Channel values go to stdout, so console logging writes to stderr. Log
//! lines carry the thread name, which tells the `artnet-rx-<universe>`
//! receive thread apart from the main task.

use anyhow::{Context, Result};
use std::fs::File;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    Layer,
};

use crate::logging::LogConfig;

/// Keeps the file writer flushing until dropped. Empty without file output.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;

    let removed = if config.file_output {
        config.cleanup_old_logs().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to clean up old log files: {}", e);
            0
        })
    } else {
        0
    };

    let console = config
        .console_output
        .then(|| console_layer(level_filter(config)));

    let (file, file_guard) = if config.file_output {
        let (writer, guard) = file_writer(config)?;
        (Some(file_layer(writer, level_filter(config))), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("A global logger is already installed")?;

    tracing::info!(level = %config.parse_level(), "Logging initialized");
    if file_guard.is_some() {
        tracing::info!(
            path = ?config.current_log_path(),
            removed,
            "Writing log file"
        );
    }

    Ok(LogGuard { _file: file_guard })
}

/// `RUST_LOG` wins over the configured level
fn level_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

fn console_layer<S>(filter: EnvFilter) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .with_filter(filter)
}

fn file_layer<S>(writer: NonBlocking, filter: EnvFilter) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_filter(filter)
}

/// Create this run's log file behind a background writer
fn file_writer(config: &LogConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let path = config.current_log_path();
    let file =
        File::create(&path).with_context(|| format!("Failed to create log file: {:?}", path))?;
    eprintln!("Logging to file: {:?}", path);
    Ok(tracing_appender::non_blocking(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config(dir: &std::path::Path) -> LogConfig {
        LogConfig {
            console_output: false,
            file_output: true,
            log_dir: dir.to_path_buf(),
            ..LogConfig::default()
        }
    }

    #[test]
    fn test_file_writer_creates_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());

        let (_writer, _guard) = file_writer(&config).unwrap();

        assert!(config.current_log_path().exists());
    }

    #[test]
    fn test_file_writer_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir.path().join("not-created"));

        assert!(file_writer(&config).is_err());
    }

    #[test]
    fn test_file_layer_records_thread_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());
        let (writer, guard) = file_writer(&config).unwrap();

        let dispatch = tracing::Dispatch::new(
            tracing_subscriber::registry().with(file_layer(writer, EnvFilter::new("info"))),
        );
        std::thread::Builder::new()
            .name("artnet-rx-7".to_string())
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || tracing::info!("frame"))
            })
            .unwrap()
            .join()
            .unwrap();
        drop(guard);

        let content = std::fs::read_to_string(config.current_log_path()).unwrap();
        assert!(content.contains("artnet-rx-7"), "log was: {}", content);
    }
}
