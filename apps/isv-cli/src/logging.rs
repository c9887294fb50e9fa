//! Run logging: an append-only action log file plus stderr diagnostics.
//!
//! The file layer records every `info`-level event as plain text. The stderr
//! layer is filtered by `RUST_LOG` and defaults to warnings only.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::{CliError, CliResult};

/// Console filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_CONSOLE_FILTER: &str = "warn";

/// Path of the log file for `action`: `{dir}/output{action}.log`.
pub fn log_path(dir: &Path, action: &str) -> PathBuf {
    dir.join(format!("output{action}.log"))
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> CliResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            CliError::Config(format!("Cannot open log file {}: {}", path.display(), e))
        })
}

/// Plain-text layer writing `info` and above to `file`.
pub fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO)
}

/// Install the global subscriber for this run and return the log file path.
pub fn init(dir: &Path, action: &str) -> CliResult<PathBuf> {
    let path = log_path(dir, action);
    let file = open_log_file(&path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer(file))
        .with(console_layer)
        .try_init()
        .map_err(|e| CliError::Config(format!("Failed to install logger: {}", e)))?;

    Ok(path)
}
