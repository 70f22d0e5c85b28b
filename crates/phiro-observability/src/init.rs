// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always on. With the `file-logging` feature and a log
//! directory, a combined JSON log is also written to a timestamped run folder:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── phiro.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Keeps log writers alive; drop it on shutdown to flush
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize the global tracing subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags
/// * `base_level` - Level for everything not raised by a flag (e.g. "info")
/// * `log_dir` - Base directory for file logs; `None` for console only
/// * `retention_runs` - Keep N most recent run folders (default: 10)
///
/// # Errors
/// Fails if a subscriber is already installed, the log directory cannot be
/// created, or a log directory is given without the `file-logging` feature.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    base_level: &str,
    log_dir: Option<PathBuf>,
    retention_runs: Option<usize>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(base_level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_filter(env_filter)
        .boxed();
    layers.push(console_layer);

    let guard = match log_dir {
        None => LoggingGuard {
            #[cfg(feature = "file-logging")]
            _file_guards: Vec::new(),
            log_dir: None,
        },
        Some(base) => file::attach(&mut layers, &filter, &base, retention_runs.unwrap_or(10))?,
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(guard)
}

/// Initialize console logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, "info", None, None)
}

#[cfg(feature = "file-logging")]
mod file {
    use super::*;
    use chrono::{NaiveDateTime, Utc};
    use tracing_appender::rolling;

    pub(super) fn attach(
        layers: &mut Vec<Box<dyn Layer<Registry> + Send + Sync>>,
        filter: &str,
        base_log_dir: &Path,
        retention_runs: usize,
    ) -> Result<LoggingGuard> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let run_folder = base_log_dir.join(format!("run_{}", timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_runs(base_log_dir, retention_runs)?;

        let appender = rolling::daily(&run_folder, "phiro.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::try_new(filter)?)
            .boxed();
        layers.push(file_layer);

        Ok(LoggingGuard {
            _file_guards: vec![guard],
            log_dir: Some(run_folder),
        })
    }

    /// Remove all but the `retention_runs` most recent `run_*` folders
    pub(super) fn cleanup_old_runs(base_log_dir: &Path, retention_runs: usize) -> Result<()> {
        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();

        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("run_"))
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%d_%H%M%S").ok());
            if let Some(stamp) = stamp {
                runs.push((path, stamp));
            }
        }

        runs.sort_by_key(|(_, stamp)| *stamp);
        let excess = runs.len().saturating_sub(retention_runs);
        for (path, _) in runs.into_iter().take(excess) {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }

        Ok(())
    }
}

#[cfg(not(feature = "file-logging"))]
mod file {
    use super::*;

    pub(super) fn attach(
        _layers: &mut Vec<Box<dyn Layer<Registry> + Send + Sync>>,
        _filter: &str,
        base_log_dir: &Path,
        _retention_runs: usize,
    ) -> Result<LoggingGuard> {
        anyhow::bail!(
            "File logging to {} requires the `file-logging` feature",
            base_log_dir.display()
        )
    }
}


#[cfg(all(test, not(feature = "file-logging")))]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_without_feature_is_rejected() {
        let flags = CrateDebugFlags::default();
        let result = init_logging(&flags, "info", Some(PathBuf::from("./logs")), None);
        assert!(result.is_err());
    }
}
