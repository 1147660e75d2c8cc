// src/joblog/naming.rs

//! Log file naming: `<Marker>_<ToolName>_<SubjectID>_<yyyy.mm.dd_HH.MM.SS>.log`.
//!
//! The progress reporter finds jobs purely by this name, so building and
//! parsing live side by side and must agree exactly.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use regex::Regex;

/// `chrono` format of the timestamp field.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d_%H.%M.%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogName {
    pub marker: String,
    pub tool: String,
    pub subject: String,
    pub timestamp: NaiveDateTime,
}

impl LogName {
    pub fn new(marker: &str, tool: &str, subject: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            marker: marker.to_string(),
            tool: tool.to_string(),
            subject: sanitize_subject(subject),
            timestamp,
        }
    }

    /// Name for a job starting now (local time).
    pub fn now(marker: &str, tool: &str, subject: &str) -> Self {
        Self::new(marker, tool, subject, Local::now().naive_local())
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.log",
            self.marker,
            self.tool,
            self.subject,
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Parse a file name produced for `marker` + `tool`.
    ///
    /// The subject may itself contain `_`; the timestamp is anchored at the end.
    pub fn parse(marker: &str, tool: &str, file_name: &str) -> Option<Self> {
        let re = Regex::new(&format!(
            r"^{}_{}_(.+)_(\d{{4}}\.\d{{2}}\.\d{{2}}_\d{{2}}\.\d{{2}}\.\d{{2}})\.log$",
            regex::escape(marker),
            regex::escape(tool)
        ))
        .ok()?;

        let caps = re.captures(file_name)?;
        let timestamp = NaiveDateTime::parse_from_str(&caps[2], TIMESTAMP_FORMAT).ok()?;

        Some(Self {
            marker: marker.to_string(),
            tool: tool.to_string(),
            subject: caps[1].to_string(),
            timestamp,
        })
    }
}

/// Glob matching every log of `tool` in a directory.
pub fn tool_glob(marker: &str, tool: &str) -> String {
    format!("{marker}_{tool}_*.log")
}

/// Subject ID for a whole-directory job: the directory's base name.
pub fn subject_from_dir(dir: &Path) -> String {
    let resolved = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

/// Subject ID for a single item (a file path or a URL): its last path
/// segment up to the first `.`.
pub fn subject_from_item(item: &str) -> String {
    let last = item
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(item);
    let stem = last.split('.').next().unwrap_or(last);
    if stem.is_empty() {
        sanitize_subject(last)
    } else {
        sanitize_subject(stem)
    }
}

/// Keep file names portable and parseable.
pub fn sanitize_subject(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn file_name_matches_documented_pattern() {
        let name = LogName::new("Z", "getFASTQ", "sample1", ts());
        assert_eq!(name.file_name(), "Z_getFASTQ_sample1_2024.01.01_10.00.00.log");
    }

    #[test]
    fn parse_inverts_file_name_even_with_underscores_in_subject() {
        let name = LogName::new("Z", "anqFASTQ", "SRR123_1", ts());
        let parsed = LogName::parse("Z", "anqFASTQ", &name.file_name()).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn parse_rejects_other_tools_and_garbage() {
        assert!(LogName::parse("Z", "trimFASTQ", "Z_getFASTQ_s_2024.01.01_10.00.00.log").is_none());
        assert!(LogName::parse("Z", "trimFASTQ", "Z_trimFASTQ_s_yesterday.log").is_none());
        assert!(LogName::parse("Z", "trimFASTQ", "nohup.out").is_none());
    }

    #[test]
    fn whitespace_in_subject_is_replaced() {
        let name = LogName::new("Z", "trimFASTQ", "my run 2", ts());
        assert_eq!(name.subject, "my-run-2");
    }

    #[test]
    fn item_subject_is_base_name_without_extensions() {
        assert_eq!(
            subject_from_item("ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR123/SRR123_1.fastq.gz"),
            "SRR123_1"
        );
        assert_eq!(subject_from_item("/data/run one/S1_R1.fastq.gz"), "S1_R1");
        assert_eq!(subject_from_item("plain"), "plain");
    }

    #[test]
    fn dir_subject_is_base_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("PRJNA42");
        std::fs::create_dir(&dir).unwrap();
        assert_eq!(subject_from_dir(&dir), "PRJNA42");
    }
}
