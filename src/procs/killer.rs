// src/procs/killer.rs

//! Best-effort termination of the user's background workers by name.
//!
//! Targets are matched by process name only; there is no check that a
//! process really descends from a holdon job, so an unrelated process with a
//! colliding name owned by the same user is terminated too.

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::{HoldonError, Result};
use crate::procs::table::{ProcessInfo, ProcessTable};

/// Which processes to terminate.
#[derive(Debug, Clone)]
pub struct ProcessPattern {
    pub name: Regex,
    /// If set, the process must also carry exactly this argument.
    pub arg: Option<String>,
}

impl ProcessPattern {
    /// Name containing `needle` (pkill-style substring match).
    pub fn name_contains(needle: &str) -> Result<Self> {
        Ok(Self {
            name: compile(&regex::escape(needle))?,
            arg: None,
        })
    }

    /// Exactly `name`, carrying `arg`.
    pub fn exact_with_arg(name: &str, arg: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: compile(&format!("^{}$", regex::escape(name)))?,
            arg: Some(arg.into()),
        })
    }

    pub fn matches(&self, p: &ProcessInfo) -> bool {
        if !self.name.is_match(&p.name) {
            return false;
        }
        match &self.arg {
            Some(arg) => p.args.iter().skip(1).any(|a| a == arg),
            None => true,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| HoldonError::Other(anyhow::anyhow!("invalid process pattern {pattern:?}: {e}")))
}

#[derive(Debug, Clone)]
pub struct KillOptions {
    pub max_passes: usize,
    pub pause: Duration,
}

impl Default for KillOptions {
    fn default() -> Self {
        Self {
            max_passes: 50,
            pause: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillSummary {
    /// Every pid signalled at least once, with its name.
    pub signalled: BTreeMap<u32, String>,
    pub passes: usize,
    /// True when the pass limit was reached with targets still present.
    pub exhausted: bool,
}

fn targets(table: &mut dyn ProcessTable, patterns: &[ProcessPattern]) -> Vec<ProcessInfo> {
    let own = table.own_pid();
    table
        .snapshot()
        .into_iter()
        .filter(|p| p.owned && Some(p.pid) != own)
        .filter(|p| patterns.iter().any(|pat| pat.matches(p)))
        .collect()
}

/// Terminate every matching process of the current user, repeating until a
/// pass finds none.
///
/// A first pass often only catches parents whose children appear (or get
/// re-spawned) afterwards, hence the loop. Finding nothing is the normal way
/// out, not an error.
pub async fn kill_all(
    table: &mut dyn ProcessTable,
    patterns: &[ProcessPattern],
    opts: &KillOptions,
) -> KillSummary {
    let mut summary = KillSummary::default();

    while summary.passes < opts.max_passes {
        let found = targets(table, patterns);
        if found.is_empty() {
            debug!(passes = summary.passes, "no matching processes left");
            return summary;
        }

        summary.passes += 1;
        for p in found {
            let ok = table.terminate(p.pid);
            info!(pid = p.pid, name = %p.name, signalled = ok, "terminating process");
            summary.signalled.entry(p.pid).or_insert(p.name);
        }

        sleep(opts.pause).await;
    }

    if !targets(table, patterns).is_empty() {
        warn!(
            passes = summary.passes,
            "processes still running after the pass limit; giving up"
        );
        summary.exhausted = true;
    }

    summary
}

/// Processes of *any* user whose name or command line contains one of
/// `needles`.
///
/// This is a plain substring scan of the whole table and can report
/// unrelated processes that merely mention a tool name.
pub fn find_running(table: &mut dyn ProcessTable, needles: &[String]) -> Vec<ProcessInfo> {
    let own = table.own_pid();
    table
        .snapshot()
        .into_iter()
        .filter(|p| Some(p.pid) != own)
        .filter(|p| {
            let cmdline = p.cmdline();
            needles
                .iter()
                .any(|n| !n.is_empty() && (p.name.contains(n.as_str()) || cmdline.contains(n.as_str())))
        })
        .collect()
}
