use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How `--progress` renders a tool's logs.
///
/// - `Downloads`: every matching log is classified on its own and listed in
///   Completed / Failed / Incoming buckets.
/// - `Cycles`: the latest log is shown from the penultimate cycle-marker
///   block to the end.
/// - `Summary`: finished items (lines matching a done pattern) plus the last line.
/// - `Dump`: the whole latest log.
/// - `Pending`: placeholder for tools without a progress parser yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    Downloads,
    Cycles,
    Summary,
    Dump,
    Pending,
}

impl Default for ReportStyle {
    fn default() -> Self {
        ReportStyle::Dump
    }
}

impl FromStr for ReportStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "downloads" => Ok(ReportStyle::Downloads),
            "cycles" => Ok(ReportStyle::Cycles),
            "summary" => Ok(ReportStyle::Summary),
            "dump" => Ok(ReportStyle::Dump),
            "pending" => Ok(ReportStyle::Pending),
            other => Err(format!(
                "invalid report style: {other} (expected downloads, cycles, summary, dump or pending)"
            )),
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportStyle::Downloads => "downloads",
            ReportStyle::Cycles => "cycles",
            ReportStyle::Summary => "summary",
            ReportStyle::Dump => "dump",
            ReportStyle::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// Where a job's items (one cycle each) come from.
///
/// In TOML: `items = { glob = "*_R1*.fastq.gz" }` or `items = { lines = "urls.txt" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    /// Files directly inside the target directory matching this glob.
    Glob(String),
    /// Non-empty, non-comment lines of this file (relative to the target).
    Lines(String),
}

/// Rule for squashing runs of near-identical lines in a cycles report.
///
/// In TOML: `collapse = { prefix = 8 }` or `collapse = { pattern = "^ROUND" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseSpec {
    /// Consecutive lines sharing their first `n` characters.
    Prefix(usize),
    /// Consecutive lines matching this regex.
    Pattern(String),
}

/// Derived state of a job, recomputed on every progress request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Completed,
    Failed,
    InProgress,
    Unknown,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::InProgress => "in progress",
            JobState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_style_parses_loosely() {
        assert_eq!(" Cycles ".parse::<ReportStyle>(), Ok(ReportStyle::Cycles));
        let err = "table".parse::<ReportStyle>().unwrap_err();
        assert!(err.contains("expected downloads, cycles"));
    }

    #[test]
    fn item_sources_deserialize_from_inline_tables() {
        #[derive(Deserialize)]
        struct Wrapper {
            items: ItemSource,
            collapse: CollapseSpec,
        }
        let w: Wrapper = toml::from_str(
            "items = { lines = \"urls.txt\" }\ncollapse = { prefix = 8 }\n",
        )
        .unwrap();
        assert_eq!(w.items, ItemSource::Lines("urls.txt".into()));
        assert_eq!(w.collapse, CollapseSpec::Prefix(8));
    }
}
