// src/progress/cycles.rs

//! Cycle-scoped views of a single job log.
//!
//! A multi-item job writes a marker block (`====`, `Cycle i/N: item`, `====`)
//! before each item. The last block may belong to an item still being
//! processed, so reports start at the block before it: the most recent one
//! whose output is complete.

use std::fmt;

use regex::Regex;

use crate::joblog::{BANNER_PREFIX, is_cycle_marker};

/// Rule for squashing repeated progress lines (e.g. an EM solver printing
/// thousands of `ROUND = n, ...` lines).
#[derive(Debug, Clone)]
pub enum Collapse {
    /// Consecutive lines whose first `n` characters are equal.
    Prefix(usize),
    /// Consecutive lines matching the regex.
    Pattern(Regex),
}

impl fmt::Display for Collapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collapse::Prefix(n) => write!(f, "lines sharing their first {n} characters"),
            Collapse::Pattern(re) => write!(f, "lines matching {}", re.as_str()),
        }
    }
}

/// Index of the line where the cycle-scoped report starts.
///
/// Marker lines pair up into blocks in order (opening, closing). With two or
/// more blocks this is the opening marker of the penultimate block; with one
/// block, that block's opening marker; with none, the start of the log.
pub fn section_start(lines: &[&str]) -> usize {
    let openings: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| is_cycle_marker(l))
        .map(|(i, _)| i)
        .step_by(2)
        .collect();

    match openings.len() {
        0 => 0,
        1 => openings[0],
        n => openings[n - 2],
    }
}

/// The lines from [`section_start`] to the end.
pub fn cycle_section<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    &lines[section_start(lines)..]
}

fn prefix(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

fn is_banner(line: &str) -> bool {
    line.starts_with(BANNER_PREFIX)
}

/// Keep only the last line of every run of near-duplicates.
///
/// Walks the lines backwards, drops a line when it collapses with the line
/// just after it, then restores the original order. holdon's own banner
/// lines never collapse.
pub fn collapse_runs<'a>(lines: &[&'a str], rule: &Collapse) -> Vec<&'a str> {
    let mut kept: Vec<&'a str> = Vec::with_capacity(lines.len());
    let mut previous: Option<&'a str> = None;

    for &line in lines.iter().rev() {
        let duplicate = match (rule, previous) {
            (_, None) => false,
            _ if is_banner(line) => false,
            (_, Some(prev)) if is_banner(prev) => false,
            (Collapse::Prefix(n), Some(prev)) => prefix(line, *n) == prefix(prev, *n),
            (Collapse::Pattern(re), Some(prev)) => re.is_match(line) && re.is_match(prev),
        };
        if !duplicate {
            kept.push(line);
        }
        previous = Some(line);
    }

    kept.reverse();
    kept
}
