#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use holdon::config::{ConfigFile, ConfigSection, RawConfigFile, ToolConfig};
use holdon::types::ReportStyle;
use tempfile::TempDir;

/// Builder for a target directory full of job logs with controlled mtimes.
pub struct LogDirBuilder {
    dir: TempDir,
    base: SystemTime,
}

impl LogDirBuilder {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
            // Fixed point in the past so "newer" always means a larger offset.
            base: SystemTime::now() - Duration::from_secs(24 * 3600),
        }
    }

    /// Write `name` with `content`, modified `offset_secs` after the base time.
    pub fn log(self, name: &str, content: &str, offset_secs: u64) -> Self {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write log");
        set_mtime(&path, self.base + Duration::from_secs(offset_secs));
        self
    }

    /// Write an arbitrary file (item lists, data files) without touching its mtime.
    pub fn file(self, name: &str, content: &str) -> Self {
        fs::write(self.dir.path().join(name), content).expect("write file");
        self
    }

    pub fn subdir(self, name: &str) -> Self {
        fs::create_dir_all(self.dir.path().join(name)).expect("create subdir");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn build(self) -> TempDir {
        self.dir
    }
}

impl Default for LogDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn set_mtime(path: &PathBuf, when: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(when))
        .expect("set mtime");
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                tool: BTreeMap::new(),
            },
        }
    }

    pub fn with_tool(mut self, name: &str, tool: ToolConfig) -> Self {
        self.config.tool.insert(name.to_string(), tool);
        self
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.config.config.marker = marker.to_string();
        self
    }

    pub fn with_motd(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.motd = Some(path.into());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A tool entry with the given report style and command, everything else default.
pub fn tool(report: ReportStyle, cmd: &[&str]) -> ToolConfig {
    ToolConfig {
        report,
        cmd: cmd.iter().map(|s| s.to_string()).collect(),
        ..ToolConfig::default()
    }
}
