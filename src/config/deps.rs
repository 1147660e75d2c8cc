// src/config/deps.rs

//! Host dependency descriptor: `hostname:tool_name:path` per line.
//!
//! Lets one shared install serve several machines whose third-party tools
//! live outside the default search path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{HoldonError, IoContext, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub host: String,
    pub tool: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyTable {
    entries: Vec<DependencyEntry>,
}

impl DependencyTable {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).op("reading dependency file", || format!("{path:?}"))?;
        Ok(Self::parse(&contents))
    }

    /// Parse descriptor text. Blank lines and `#` comments are skipped;
    /// malformed lines are reported and ignored.
    pub fn parse(contents: &str) -> Self {
        let mut entries = Vec::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // The path itself may contain ':' so only split twice.
            let mut fields = line.splitn(3, ':');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(host), Some(tool), Some(path))
                    if !host.is_empty() && !tool.is_empty() && !path.is_empty() =>
                {
                    entries.push(DependencyEntry {
                        host: host.trim().to_string(),
                        tool: tool.trim().to_string(),
                        path: PathBuf::from(path.trim()),
                    });
                }
                _ => warn!(line = idx + 1, content = %line, "malformed dependency line; ignoring"),
            }
        }

        Self { entries }
    }

    pub fn lookup(&self, host: &str, tool: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.host == host && e.tool == tool)
            .map(|e| e.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name of the machine we are running on, used as the descriptor key.
pub fn current_host() -> String {
    nix::unistd::gethostname()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Locate `program`: descriptor entry for `host` first, then `PATH`.
///
/// A descriptor path naming a directory is joined with the program name.
pub fn resolve_program(table: &DependencyTable, host: &str, program: &str) -> Result<PathBuf> {
    if let Some(path) = table.lookup(host, program) {
        let candidate = if path.is_dir() {
            path.join(program)
        } else {
            path.to_path_buf()
        };
        if candidate.is_file() {
            debug!(program, path = ?candidate, "resolved via dependency file");
            return Ok(candidate);
        }
        warn!(program, path = ?candidate, "dependency file entry does not exist; trying PATH");
    }

    which::which(program).map_err(|_| HoldonError::MissingDependency(program.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_and_skips_noise() {
        let table = DependencyTable::parse(
            "# host:tool:path\n\
             \n\
             node01:STAR:/opt/star/bin\n\
             node01:rsem:/opt/rsem\n\
             broken line\n\
             node02:fastqc:C:/tools/fastqc\n",
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("node01", "STAR"), Some(Path::new("/opt/star/bin")));
        assert_eq!(table.lookup("node02", "fastqc"), Some(Path::new("C:/tools/fastqc")));
        assert_eq!(table.lookup("node02", "STAR"), None);
    }

    #[test]
    fn descriptor_directory_is_joined_with_program() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("mytool");
        fs::write(&bin, "#!/bin/sh\n").unwrap();

        let table = DependencyTable::parse(&format!("hostA:mytool:{}", dir.path().display()));
        let resolved = resolve_program(&table, "hostA", "mytool").unwrap();
        assert_eq!(resolved, bin);
    }

    #[test]
    fn unknown_program_is_missing_dependency() {
        let table = DependencyTable::default();
        match resolve_program(&table, "hostA", "definitely-not-installed-holdon-xyz") {
            Err(HoldonError::MissingDependency(name)) => {
                assert_eq!(name, "definitely-not-installed-holdon-xyz")
            }
            other => panic!("expected MissingDependency, got {other:?}"),
        }
    }
}
