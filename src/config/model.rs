// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::errors::{HoldonError, Result};
use crate::progress::cycles::Collapse;
use crate::types::{CollapseSpec, ItemSource, ReportStyle};

/// Raw configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// marker = "Z"
/// grace_ms = 500
///
/// [tool.trimFASTQ]
/// report = "cycles"
/// program = "bbduk.sh"
/// items = { glob = "*_R1*.fastq.gz" }
/// ```
///
/// Every section is optional. Tool entries replace the built-in profile of
/// the same name, or add a new tool.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub tool: BTreeMap<String, ToolConfig>,
}

/// `[config]` section: knobs shared by every tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Fixed sortable prefix of every log file name.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// How long the launcher waits before deciding the job started fine.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Lines of the job log printed as the "scheduled" acknowledgment.
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,

    /// How long the launcher polls for the job log to appear.
    #[serde(default = "default_log_wait_ms")]
    pub log_wait_ms: u64,

    /// Upper bound on kill passes, for processes that ignore SIGTERM.
    #[serde(default = "default_kill_passes")]
    pub kill_passes: usize,

    #[serde(default = "default_kill_pause_ms")]
    pub kill_pause_ms: u64,

    /// Message-of-the-day file to annotate while jobs run (best effort).
    #[serde(default)]
    pub motd: Option<PathBuf>,

    /// `hostname:tool:path` descriptor used to locate installed programs.
    #[serde(default)]
    pub deps_file: Option<PathBuf>,
}

fn default_marker() -> String {
    "Z".to_string()
}

fn default_grace_ms() -> u64 {
    500
}

fn default_preview_lines() -> usize {
    12
}

fn default_log_wait_ms() -> u64 {
    5000
}

fn default_kill_passes() -> usize {
    50
}

fn default_kill_pause_ms() -> u64 {
    200
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            grace_ms: default_grace_ms(),
            preview_lines: default_preview_lines(),
            log_wait_ms: default_log_wait_ms(),
            kill_passes: default_kill_passes(),
            kill_pause_ms: default_kill_pause_ms(),
            motd: None,
            deps_file: None,
        }
    }
}

impl ConfigSection {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn log_wait(&self) -> Duration {
        Duration::from_millis(self.log_wait_ms)
    }

    pub fn kill_pause(&self) -> Duration {
        Duration::from_millis(self.kill_pause_ms)
    }
}

/// `[tool.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Progress rendering style.
    #[serde(default)]
    pub report: ReportStyle,

    /// External program the tool depends on (resolved before launching).
    #[serde(default)]
    pub program: Option<String>,

    /// Process names targeted by `--kill` and by the already-running check.
    #[serde(default)]
    pub processes: Vec<String>,

    /// One cycle per item; absent means a single run.
    #[serde(default)]
    pub items: Option<ItemSource>,

    /// Launch one detached job (and log) per item instead of cycling.
    #[serde(default)]
    pub fan_out: bool,

    /// Refuse to start while any of `processes` is running anywhere.
    #[serde(default)]
    pub exclusive: bool,

    /// Default command template; `{item}`, `{dir}` and `{subject}` are expanded.
    #[serde(default)]
    pub cmd: Vec<String>,

    #[serde(default)]
    pub collapse: Option<CollapseSpec>,

    /// Lines marking a finished item, for `report = "summary"`.
    #[serde(default)]
    pub done_pattern: Option<String>,
}

/// A validated tool entry with its patterns compiled.
#[derive(Debug, Clone)]
pub struct ToolProfile {
    pub name: String,
    pub report: ReportStyle,
    pub program: Option<String>,
    pub processes: Vec<String>,
    pub items: Option<ItemSource>,
    pub fan_out: bool,
    pub exclusive: bool,
    pub cmd: Vec<String>,
    pub collapse: Option<Collapse>,
    pub done_pattern: Option<Regex>,
}

/// Validated configuration: global settings plus every known tool profile.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    tools: BTreeMap<String, ToolProfile>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, tools: BTreeMap<String, ToolProfile>) -> Self {
        Self { config, tools }
    }

    /// Built-in profiles with default settings.
    pub fn builtin() -> Result<Self> {
        ConfigFile::try_from(RawConfigFile::default())
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolProfile> {
        self.tools.values()
    }

    /// Look up a tool by name; unknown names are an unsupported feature.
    pub fn tool(&self, name: &str) -> Result<&ToolProfile> {
        self.tools.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.tools.keys().map(String::as_str).collect();
            HoldonError::Unsupported(format!(
                "unknown tool '{name}' (known tools: {})",
                known.join(", ")
            ))
        })
    }
}
