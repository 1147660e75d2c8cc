// src/joblog/logger.rs

//! Append-only job log sink with optional echo to stdout.
//!
//! The file is opened in append mode and closed again on every call; no
//! handle is kept. Concurrent jobs writing the same file therefore interleave
//! at line granularity at best, and a multi-line message from one writer may
//! be split by another writer's lines. That is accepted: each job normally
//! owns its own log.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::{IoContext, Result};

/// Append `lines` to `path` (creating the file) and, if `verbose`, print them.
///
/// The parent directory must already exist; it is never created here.
pub fn log<S: AsRef<str>>(verbose: bool, path: &Path, lines: &[S]) -> Result<()> {
    let mut buf = String::new();
    for line in lines {
        let line = line.as_ref();
        buf.push_str(line);
        if !line.ends_with('\n') {
            buf.push('\n');
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .op("opening log", || format!("{path:?}"))?;
    file.write_all(buf.as_bytes())
        .op("appending to log", || format!("{path:?}"))?;

    if verbose {
        let mut out = io::stdout().lock();
        out.write_all(buf.as_bytes())
            .and_then(|_| out.flush())
            .op("echoing log lines", || format!("{path:?}"))?;
    }

    Ok(())
}

/// A log path bundled with the echo setting, for code that logs repeatedly.
#[derive(Debug, Clone)]
pub struct JobLogger {
    path: PathBuf,
    verbose: bool,
}

impl JobLogger {
    pub fn new(path: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            path: path.into(),
            verbose,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn line(&self, line: impl AsRef<str>) -> Result<()> {
        log(self.verbose, &self.path, &[line.as_ref()])
    }

    pub fn lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<()> {
        log(self.verbose, &self.path, lines)
    }
}
