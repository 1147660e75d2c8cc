// src/procs/mod.rs

//! Process-table access: `--kill` and the already-running precondition.

pub mod killer;
pub mod table;

pub use killer::{KillOptions, KillSummary, ProcessPattern, find_running, kill_all};
pub use table::{ProcessInfo, ProcessTable, SystemProcessTable};

use tracing::debug;

use crate::config::ToolProfile;
use crate::errors::{HoldonError, Result};

/// Argument that identifies a detached worker of `tool` in the process table.
pub fn worker_tool_arg(tool: &str) -> String {
    format!("--tool={tool}")
}

/// Everything `--kill` targets for `tool`: its detached workers (so no new
/// cycle starts) plus the external programs it drives.
pub fn kill_patterns(tool: &ToolProfile, worker_name: &str) -> Result<Vec<ProcessPattern>> {
    let mut patterns = vec![ProcessPattern::exact_with_arg(
        worker_name,
        worker_tool_arg(&tool.name),
    )?];
    for name in &tool.processes {
        patterns.push(ProcessPattern::name_contains(name)?);
    }
    Ok(patterns)
}

/// Refuse to start an exclusive tool while any process (of any user)
/// mentions one of its program names.
pub fn ensure_not_running(table: &mut dyn ProcessTable, tool: &ToolProfile) -> Result<()> {
    if !tool.exclusive {
        return Ok(());
    }
    let running = find_running(table, &tool.processes);
    debug!(tool = %tool.name, matches = running.len(), "already-running check");

    match running.first() {
        None => Ok(()),
        Some(p) => Err(HoldonError::AlreadyRunning(format!(
            "{} found {} matching process(es), e.g. pid {} ({}); wait for it to finish or use --kill",
            tool.name,
            running.len(),
            p.pid,
            p.name
        ))),
    }
}
