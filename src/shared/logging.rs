//! Diagnostic log for hook runs.
//!
//! Every component logs through `tracing`; this module installs the subscriber
//! that writes those events to `hook-debug.log` in the store directory.
//! Installing the subscriber can never fail the caller: if the log file cannot
//! be opened, events are discarded.

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use super::cache::LOG_FILE_NAME;
use super::config::{LogConfig, LogFormat};
use super::env_var::EnvVars;

const FALLBACK_FILTER: &str = "info";

/// Picks the filter directive: `TMUX_NOTIFY_LOG` wins over the config file.
pub fn resolve_level<'a>(env: &'a EnvVars, config: &'a LogConfig) -> &'a str {
    env.log.as_deref().unwrap_or(&config.level)
}

/// Builds an `EnvFilter`, falling back to `info` for unparsable directives.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Opens `hook-debug.log` in `dir` for appending, creating the directory if needed.
fn open_appender(dir: &Path) -> Option<RollingFileAppender> {
    fs::create_dir_all(dir).ok()?;

    let (prefix, suffix) = LOG_FILE_NAME.rsplit_once('.')?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(prefix)
        .filename_suffix(suffix)
        .build(dir)
        .ok()
}

/// Installs the global subscriber. Subsequent calls are no-ops.
pub fn init(log_dir: Option<&Path>, level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_ansi(false)
        .with_target(false);

    let appender = log_dir.and_then(open_appender);

    // An already-installed subscriber is not an error for a one-shot process.
    let _ = match (appender, format) {
        (Some(appender), LogFormat::Text) => builder.with_writer(appender).try_init(),
        (Some(appender), LogFormat::Json) => builder.json().with_writer(appender).try_init(),
        (None, _) => builder.with_writer(std::io::sink).try_init(),
    };
}
