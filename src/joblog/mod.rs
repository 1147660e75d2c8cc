// src/joblog/mod.rs

//! The job log: the only persistent artifact of a job.
//!
//! - [`naming`] builds and parses log file names.
//! - [`logger`] appends lines (and optionally echoes them).
//! - [`select`] finds a tool's logs in a directory and picks the latest.
//!
//! It also defines the banner lines the worker writes and the classification
//! rules read back.

pub mod logger;
pub mod naming;
pub mod select;

pub use logger::{JobLogger, log};
pub use naming::{LogName, subject_from_dir, subject_from_item, tool_glob};
pub use select::{LogFile, latest_log, matching_logs, pick_latest};

/// Prefix of every line holdon itself writes into a job log.
pub const BANNER_PREFIX: &str = "holdon:";

pub const JOB_STARTED: &str = "holdon: job started";
pub const JOB_COMPLETED: &str = "holdon: job completed";
pub const JOB_FAILED: &str = "holdon: job failed";
pub const CANNOT_START: &str = "holdon: cannot start";

/// Line delimiting a cycle block.
pub const CYCLE_MARKER: &str = "============================================================";

/// True for lines made only of `=` (at least three), ignoring trailing space.
pub fn is_cycle_marker(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'=')
}

/// The three lines announcing cycle `index` (1-based) of `total`.
pub fn cycle_block(index: usize, total: usize, item: &str) -> [String; 3] {
    [
        CYCLE_MARKER.to_string(),
        format!("Cycle {index}/{total}: {item}"),
        CYCLE_MARKER.to_string(),
    ]
}
