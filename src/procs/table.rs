// src/procs/table.rs

//! Process-table abstraction.
//!
//! The killer and the already-running check talk to a `ProcessTable` instead
//! of the OS directly, so tests can provide a scripted table.

use std::fmt::Debug;

use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, Signal, System};

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub args: Vec<String>,
    /// Whether the invoking user owns this process.
    pub owned: bool,
}

impl ProcessInfo {
    pub fn cmdline(&self) -> String {
        self.args.join(" ")
    }
}

pub trait ProcessTable: Send + Debug {
    /// Fresh view of every visible process that can still be signalled.
    fn snapshot(&mut self) -> Vec<ProcessInfo>;

    /// Ask `pid` to terminate (SIGTERM). Returns false if it could not be signalled.
    fn terminate(&mut self, pid: u32) -> bool;

    /// Pid of the calling process, never targeted.
    fn own_pid(&self) -> Option<u32>;
}

/// Implementation backed by `sysinfo`.
pub struct SystemProcessTable {
    system: System,
}

impl Debug for SystemProcessTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemProcessTable").finish_non_exhaustive()
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl ProcessTable for SystemProcessTable {
    fn snapshot(&mut self) -> Vec<ProcessInfo> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );

        let me = self
            .own_pid()
            .and_then(|pid| self.system.process(Pid::from_u32(pid)))
            .and_then(|p| p.user_id().cloned());

        // Zombies are already dead; signalling them again never helps.
        self.system
            .processes()
            .values()
            .filter(|p| p.status() != ProcessStatus::Zombie)
            .map(|p| ProcessInfo {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                args: p
                    .cmd()
                    .iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
                owned: match (&me, p.user_id()) {
                    (Some(me), Some(uid)) => me == uid,
                    _ => false,
                },
            })
            .collect()
    }

    fn terminate(&mut self, pid: u32) -> bool {
        match self.system.process(Pid::from_u32(pid)) {
            Some(p) => p.kill_with(Signal::Term).unwrap_or_else(|| p.kill()),
            None => false,
        }
    }

    fn own_pid(&self) -> Option<u32> {
        Some(std::process::id())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Command;
    use std::thread::sleep;
    use std::time::Duration;

    use super::*;

    #[test]
    fn exited_but_unreaped_children_are_not_listed() {
        let mut live = Command::new("sleep").arg("5").spawn().unwrap();
        let mut dead = Command::new("true").spawn().unwrap();
        sleep(Duration::from_millis(300));

        let mut table = SystemProcessTable::new();
        let pids: Vec<u32> = table.snapshot().iter().map(|p| p.pid).collect();

        assert!(pids.contains(&live.id()));
        assert!(!pids.contains(&dead.id()));

        live.kill().unwrap();
        live.wait().unwrap();
        dead.wait().unwrap();
    }
}
