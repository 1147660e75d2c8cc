// src/joblog/select.rs

//! Finding a tool's logs in a target directory (depth 1 only).

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use globset::{Glob, GlobMatcher};

use crate::errors::{HoldonError, IoContext, Result};
use crate::joblog::naming::tool_glob;

/// A log file candidate with the metadata used for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: SystemTime,
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = Glob::new(pattern)
        .map_err(|e| HoldonError::Other(anyhow::anyhow!("invalid log glob {pattern}: {e}")))?;
    Ok(glob.compile_matcher())
}

/// All regular files directly in `dir` matching the tool's log glob,
/// sorted by file name.
pub fn matching_logs(dir: &Path, marker: &str, tool: &str) -> Result<Vec<LogFile>> {
    let matcher = compile(&tool_glob(marker, tool))?;
    let mut logs = Vec::new();

    let entries = fs::read_dir(dir).op("listing target directory", || format!("{dir:?}"))?;
    for entry in entries {
        let entry = entry.op("listing target directory", || format!("{dir:?}"))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !matcher.is_match(&file_name) {
            continue;
        }

        let meta = entry
            .metadata()
            .op("reading log metadata", || format!("{:?}", entry.path()))?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta
            .modified()
            .op("reading log mtime", || format!("{:?}", entry.path()))?;

        logs.push(LogFile {
            path: entry.path(),
            file_name,
            modified,
        });
    }

    logs.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(logs)
}

/// Greatest modification time wins; equal times fall back to the
/// lexicographically greatest file name so the choice is stable.
pub fn pick_latest(logs: &[LogFile]) -> Option<&LogFile> {
    logs.iter().max_by(|a, b| match a.modified.cmp(&b.modified) {
        Ordering::Equal => a.file_name.cmp(&b.file_name),
        other => other,
    })
}

/// The latest log of `tool` in `dir`, or `NoLogFound`.
pub fn latest_log(dir: &Path, marker: &str, tool: &str) -> Result<LogFile> {
    let logs = matching_logs(dir, marker, tool)?;
    pick_latest(&logs).cloned().ok_or_else(|| HoldonError::NoLogFound {
        pattern: tool_glob(marker, tool),
        dir: dir.to_path_buf(),
    })
}
