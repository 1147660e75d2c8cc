// src/progress/report.rs

use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::ToolProfile;
use crate::errors::{HoldonError, IoContext, Result};
use crate::joblog::{LogFile, latest_log, matching_logs, tool_glob};
use crate::progress::cycles::{collapse_runs, cycle_section};
use crate::progress::downloads::{aggregate_state, classify_download, render_downloads};
use crate::progress::rules::{RuleTable, last_line};
use crate::types::{JobState, ReportStyle};

/// Human-readable progress summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub tool: String,
    pub state: JobState,
    pub headline: String,
    pub body: String,
}

impl fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline)?;
        writeln!(f)?;
        write!(f, "{}", self.body)?;
        if !self.body.is_empty() && !self.body.ends_with('\n') {
            writeln!(f)?;
        }
        Ok(())
    }
}

fn read_log(log: &LogFile) -> Result<String> {
    let bytes = fs::read(&log.path).op("reading log", || format!("{:?}", log.path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Point-in-time progress report for `tool` in `target_dir`.
///
/// Never blocks and keeps no state: safe to call against a log that is still
/// growing, and calling it twice on an unchanged directory gives the same text.
pub fn report(tool: &ToolProfile, marker: &str, target_dir: &Path) -> Result<RenderedReport> {
    if tool.report == ReportStyle::Downloads {
        return report_downloads(tool, marker, target_dir);
    }

    let log = latest_log(target_dir, marker, &tool.name)?;
    debug!(tool = %tool.name, log = %log.file_name, "selected latest log");
    let content = read_log(&log)?;
    let state = RuleTable::banners()?.classify(&content).state;
    let lines: Vec<&str> = content.lines().collect();

    let body = match tool.report {
        ReportStyle::Cycles => {
            let section = cycle_section(&lines);
            let shown = match &tool.collapse {
                Some(rule) => collapse_runs(section, rule),
                None => section.to_vec(),
            };
            join_lines(&shown)
        }
        ReportStyle::Summary => render_summary(tool, &content),
        // Downloads returned early; a single download log is shown whole.
        ReportStyle::Dump | ReportStyle::Downloads => content.clone(),
        ReportStyle::Pending => {
            format!("progress report for {} is not yet implemented\n", tool.name)
        }
    };

    Ok(RenderedReport {
        tool: tool.name.clone(),
        state,
        headline: format!("{} job {} (log: {})", tool.name, state, log.file_name),
        body,
    })
}

fn report_downloads(tool: &ToolProfile, marker: &str, target_dir: &Path) -> Result<RenderedReport> {
    let logs = matching_logs(target_dir, marker, &tool.name)?;
    if logs.is_empty() {
        return Err(HoldonError::NoLogFound {
            pattern: tool_glob(marker, &tool.name),
            dir: target_dir.to_path_buf(),
        });
    }

    let rules = RuleTable::downloads()?;
    let mut entries = Vec::with_capacity(logs.len());
    for log in &logs {
        let content = read_log(log)?;
        entries.push(classify_download(&rules, marker, &tool.name, log, &content));
    }

    let count = |s: JobState| entries.iter().filter(|e| e.state == s).count();
    let headline = format!(
        "{} downloads in {}: {} completed, {} failed, {} incoming",
        tool.name,
        target_dir.display(),
        count(JobState::Completed),
        count(JobState::Failed),
        count(JobState::InProgress),
    );

    Ok(RenderedReport {
        tool: tool.name.clone(),
        state: aggregate_state(&entries),
        headline,
        body: render_downloads(&entries),
    })
}

fn render_summary(tool: &ToolProfile, content: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Completed:");

    let done: Vec<&str> = match &tool.done_pattern {
        Some(re) => content.lines().filter(|l| re.is_match(l)).collect(),
        None => Vec::new(),
    };
    if done.is_empty() {
        let _ = writeln!(out, "  no completed items");
    }
    for line in done {
        let _ = writeln!(out, "  {line}");
    }

    let _ = writeln!(out, "Last: {}", last_line(content).unwrap_or(""));
    out
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
