// src/progress/rules.rs

//! Job-state classification as data: an ordered table of (probe, state).
//!
//! The first rule whose probe matches decides the state; no match means
//! [`JobState::Unknown`]. New patterns are new rows, not new branches.

use regex::Regex;

use crate::errors::{HoldonError, Result};
use crate::joblog::{CANNOT_START, JOB_COMPLETED, JOB_FAILED, JOB_STARTED};
use crate::types::JobState;

#[derive(Debug, Clone)]
pub enum Probe {
    /// Any line of the log matches.
    AnyLine(Regex),
    /// The last non-empty line matches (after the last carriage return).
    LastLine(Regex),
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub probe: Probe,
    pub state: JobState,
}

/// Outcome of classifying one log, with the line that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub state: JobState,
    pub line: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

fn regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| HoldonError::Other(anyhow::anyhow!("invalid rule pattern {pattern:?}: {e}")))
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// wget-style download logs, as narrated by the holdon worker.
    ///
    /// wget draws a bar (`45%[===>   ]`) on a terminal or with
    /// `--progress=bar:force`, and dot rows (`5000K .......... 4% 2.30M 9m`)
    /// otherwise.
    pub fn downloads() -> Result<Self> {
        Ok(Self::new(vec![
            Rule {
                probe: Probe::AnyLine(regex(
                    r"(?i)connection terminated|unable to resolve|unable to|not found",
                )?),
                state: JobState::Failed,
            },
            Rule {
                probe: Probe::AnyLine(regex(&format!(
                    "^(?:{}|{})",
                    regex::escape(JOB_FAILED),
                    regex::escape(CANNOT_START)
                ))?),
                state: JobState::Failed,
            },
            Rule {
                probe: Probe::LastLine(regex(r"\d+%\[")?),
                state: JobState::InProgress,
            },
            Rule {
                probe: Probe::LastLine(regex(r"^\s*\d+K[ .]+\s\d+%\s")?),
                state: JobState::InProgress,
            },
            Rule {
                probe: Probe::AnyLine(regex(r"saved|already there")?),
                state: JobState::Completed,
            },
        ]))
    }

    /// Logs written by the holdon worker, judged by its banner lines.
    pub fn banners() -> Result<Self> {
        Ok(Self::new(vec![
            Rule {
                probe: Probe::LastLine(regex(&format!("^{}", regex::escape(JOB_COMPLETED)))?),
                state: JobState::Completed,
            },
            Rule {
                probe: Probe::AnyLine(regex(&format!(
                    "^(?:{}|{})",
                    regex::escape(JOB_FAILED),
                    regex::escape(CANNOT_START)
                ))?),
                state: JobState::Failed,
            },
            Rule {
                probe: Probe::AnyLine(regex(&format!("^{}", regex::escape(JOB_STARTED)))?),
                state: JobState::InProgress,
            },
        ]))
    }

    pub fn classify<'a>(&self, content: &'a str) -> Classification<'a> {
        let last = last_line(content);

        for rule in &self.rules {
            let hit = match &rule.probe {
                Probe::AnyLine(re) => content.lines().find(|l| re.is_match(l)),
                Probe::LastLine(re) => last.filter(|l| re.is_match(l)),
            };
            if let Some(line) = hit {
                return Classification {
                    state: rule.state,
                    line: Some(line.trim_end_matches('\r')),
                };
            }
        }

        Classification {
            state: JobState::Unknown,
            line: last,
        }
    }
}

/// Last non-empty line, reduced to what a terminal would show when the
/// writer redraws it with carriage returns.
pub fn last_line(content: &str) -> Option<&str> {
    let line = content.lines().rev().find(|l| !l.trim().is_empty())?;
    line.split('\r').rev().find(|seg| !seg.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_beats_a_later_progress_line() {
        let table = RuleTable::downloads().unwrap();
        let log = "Resolving ftp.sra.ebi.ac.uk... failed: Name or service not known.\n\
                   wget: unable to resolve host address 'ftp.sra.ebi.ac.uk'\n\
                   10%[=>   ] 1000\n";
        let c = table.classify(log);
        assert_eq!(c.state, JobState::Failed);
        assert_eq!(c.line, Some("wget: unable to resolve host address 'ftp.sra.ebi.ac.uk'"));
    }

    #[test]
    fn progress_only_counts_on_the_last_line() {
        let table = RuleTable::downloads().unwrap();
        let log = "10%[=>   ] 1000\n\
                   2024-01-01 10:00:00 (1.2 MB/s) - 'SRR1_1.fastq.gz' saved [123/123]\n";
        assert_eq!(table.classify(log).state, JobState::Completed);

        let log = "Length: 123 (123B)\r\n 45%[====>    ] 1234567\n";
        let c = table.classify(log);
        assert_eq!(c.state, JobState::InProgress);
        assert_eq!(c.line, Some(" 45%[====>    ] 1234567"));
    }

    #[test]
    fn dot_style_progress_is_in_progress() {
        let table = RuleTable::downloads().unwrap();
        let log = "holdon: job started 2024-01-01 10:00:00\n\
                   Length: 1234567890 (1.1G) [application/x-gzip]\n\
                   Saving to: 'SRR1_1.fastq.gz'\n\
                   \n     \
                   0K .......... .......... .......... .......... ..........  0% 1.20M 16m\n  \
                   5000K .......... .......... .......... .......... ..........  4% 2.30M 9m\n";
        let c = table.classify(log);
        assert_eq!(c.state, JobState::InProgress);
        assert_eq!(
            c.line,
            Some("  5000K .......... .......... .......... .......... ..........  4% 2.30M 9m")
        );
    }

    #[test]
    fn worker_failure_banner_fails_a_download() {
        let table = RuleTable::downloads().unwrap();
        let log = "holdon: job started 2024-01-01 10:00:00\n\
                   HTTP request sent, awaiting response... 403 Forbidden\n\
                   2024-01-01 10:00:01 ERROR 403: Forbidden.\n\
                   holdon: cycle 1/1 exited with status 8\n\
                   holdon: job failed 2024-01-01 10:00:01 (1 of 1 cycles failed)\n";
        let c = table.classify(log);
        assert_eq!(c.state, JobState::Failed);
        assert_eq!(c.line, Some("holdon: job failed 2024-01-01 10:00:01 (1 of 1 cycles failed)"));

        let log = "holdon: job started x\nholdon: cannot start wget: No such file or directory\n";
        assert_eq!(table.classify(log).state, JobState::Failed);
    }

    #[test]
    fn carriage_return_redraws_keep_the_latest_segment() {
        assert_eq!(last_line("a\n 1%[>] 1\r 2%[>] 2\r 3%[>] 3\n\n"), Some(" 3%[>] 3"));
        assert_eq!(last_line(""), None);
    }

    #[test]
    fn unmatched_log_is_unknown() {
        let table = RuleTable::downloads().unwrap();
        let c = table.classify("--2024-01-01--  https://example.org/x\nConnecting...\n");
        assert_eq!(c.state, JobState::Unknown);
        assert_eq!(c.line, Some("Connecting..."));
    }

    #[test]
    fn banner_rules_follow_worker_lifecycle() {
        let table = RuleTable::banners().unwrap();
        assert_eq!(
            table.classify("holdon: job started 2024.01.01_10.00.00\nworking\n").state,
            JobState::InProgress
        );
        assert_eq!(
            table
                .classify("holdon: job started x\nholdon: job completed 2024.01.01_11.00.00\n")
                .state,
            JobState::Completed
        );
        assert_eq!(
            table
                .classify("holdon: job started x\nholdon: job failed y (1 of 2 cycles failed)\n")
                .state,
            JobState::Failed
        );
        assert_eq!(table.classify("random text\n").state, JobState::Unknown);
    }
}
