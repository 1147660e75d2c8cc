// src/launch/motd.rs

//! Best-effort "job running" note in a message-of-the-day file.
//!
//! Nothing here may fail a job: every I/O problem is a warning.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// A line we appended to the MOTD file and must take out again.
#[derive(Debug)]
pub struct MotdNote {
    path: PathBuf,
    line: String,
}

impl MotdNote {
    /// Append `line` to `path`. Returns `None` if the file could not be written.
    pub fn post(path: &Path, line: impl Into<String>) -> Option<Self> {
        let line = line.into();
        let appended = OpenOptions::new()
            .append(true)
            .open(path)
            .and_then(|mut f| writeln!(f, "{line}"));

        match appended {
            Ok(()) => {
                debug!(motd = ?path, "posted job note");
                Some(Self {
                    path: path.to_path_buf(),
                    line,
                })
            }
            Err(e) => {
                warn!(motd = ?path, error = %e, "could not update message of the day");
                None
            }
        }
    }

    /// Remove the first occurrence of our line, leaving everything else as is.
    pub fn clear(self) {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!(motd = ?self.path, error = %e, "could not read message of the day");
                return;
            }
        };

        let mut removed = false;
        let mut kept = String::with_capacity(contents.len());
        for line in contents.split_inclusive('\n') {
            if !removed && line.trim_end_matches('\n') == self.line {
                removed = true;
                continue;
            }
            kept.push_str(line);
        }

        if !removed {
            debug!(motd = ?self.path, "job note already gone");
            return;
        }
        if let Err(e) = fs::write(&self.path, kept) {
            warn!(motd = ?self.path, error = %e, "could not restore message of the day");
        }
    }
}
