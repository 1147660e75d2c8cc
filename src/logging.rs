// src/logging.rs

//! Diagnostic logging for `holdon` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `HOLDON_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`, or `warn` inside a detached worker
//!
//! Logs are sent to STDERR so stdout stays free for reports and previews.
//!
//! A detached worker is different: its stderr is the launcher's capture
//! file, where any output counts as an early failure message. Its
//! diagnostics are appended to the job log instead, without colour, and
//! stderr is left to the fatal errors `main` prints.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::LogLevel;
use crate::joblog::JobLogger;

pub const LOG_ENV: &str = "HOLDON_LOG";

/// Initialise global logging subscriber.
///
/// `job_log` is set in a detached worker: diagnostics go to that file.
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, job_log: Option<&Path>) -> Result<()> {
    let fallback = if job_log.is_some() { Level::WARN } else { Level::INFO };
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var(LOG_ENV)
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(fallback),
    };

    match job_log {
        None => fmt()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?,
        Some(path) => job_log_subscriber(level, JobLogger::new(path, false))
            .try_init()
            .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?,
    }

    Ok(())
}

/// Subscriber of a detached worker: plain lines appended to its job log.
fn job_log_subscriber(level: Level, logger: JobLogger) -> impl Subscriber + Send + Sync {
    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .log_internal_errors(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(logger)
        .finish()
}

/// One formatted event, appended to the job log in a single write.
///
/// The file is opened per event like every other log write, so the worker
/// and the wrapped program can share it.
#[derive(Debug)]
pub struct JobLogWriter<'a> {
    path: &'a Path,
}

impl Write for JobLogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = OpenOptions::new().create(true).append(true).open(self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for JobLogger {
    type Writer = JobLogWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        JobLogWriter { path: self.path() }
    }
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
