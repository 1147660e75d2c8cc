// src/progress/downloads.rs

//! Downloads run as parallel jobs, one log each. Every log is classified on
//! its own (there is no ordering across files) and grouped into buckets.

use std::fmt::Write as _;

use tracing::warn;

use crate::joblog::{LogFile, LogName};
use crate::progress::rules::RuleTable;
use crate::types::JobState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub subject: String,
    pub file_name: String,
    pub state: JobState,
    /// The line that decided the state (or the last line when unclassified).
    pub line: Option<String>,
}

pub fn classify_download(
    rules: &RuleTable,
    marker: &str,
    tool: &str,
    log: &LogFile,
    content: &str,
) -> DownloadEntry {
    let subject = LogName::parse(marker, tool, &log.file_name)
        .map(|n| n.subject)
        .unwrap_or_else(|| log.file_name.clone());

    let c = rules.classify(content);
    if c.state == JobState::Unknown {
        warn!(log = %log.file_name, "cannot classify download log");
    }

    DownloadEntry {
        subject,
        file_name: log.file_name.clone(),
        state: c.state,
        line: c.line.map(str::to_string),
    }
}

/// Overall state of a set of downloads.
pub fn aggregate_state(entries: &[DownloadEntry]) -> JobState {
    if entries.iter().any(|e| e.state == JobState::InProgress) {
        JobState::InProgress
    } else if entries.iter().any(|e| e.state == JobState::Failed) {
        JobState::Failed
    } else if !entries.is_empty() && entries.iter().all(|e| e.state == JobState::Completed) {
        JobState::Completed
    } else {
        JobState::Unknown
    }
}

fn bucket(out: &mut String, title: &str, empty: &str, entries: &[&DownloadEntry]) {
    let _ = writeln!(out, "{title}:");
    if entries.is_empty() {
        let _ = writeln!(out, "  {empty}");
        return;
    }
    for e in entries {
        let _ = writeln!(out, "  {}: {}", e.subject, e.line.as_deref().unwrap_or(""));
    }
}

/// Completed / Failed / Incoming buckets; empty buckets are spelled out.
pub fn render_downloads(entries: &[DownloadEntry]) -> String {
    let pick = |state: JobState| -> Vec<&DownloadEntry> {
        entries.iter().filter(|e| e.state == state).collect()
    };

    let mut out = String::new();
    bucket(&mut out, "Completed", "no completed items", &pick(JobState::Completed));
    bucket(&mut out, "Failed", "no failed items", &pick(JobState::Failed));
    bucket(&mut out, "Incoming", "no incoming items", &pick(JobState::InProgress));

    for e in pick(JobState::Unknown) {
        let _ = writeln!(out, "WARNING: cannot classify {}", e.file_name);
    }

    out
}
