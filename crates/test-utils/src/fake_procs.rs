use std::collections::{BTreeMap, BTreeSet};

use holdon::procs::{ProcessInfo, ProcessTable};

/// A scripted process table that:
/// - serves a fixed list of processes
/// - removes a process when it is terminated, unless marked stubborn
/// - can make children appear once their parent is terminated
/// - records every terminate call
#[derive(Debug, Clone, Default)]
pub struct FakeProcessTable {
    procs: Vec<ProcessInfo>,
    stubborn: BTreeSet<u32>,
    spawned_on_kill: BTreeMap<u32, Vec<ProcessInfo>>,
    own_pid: Option<u32>,
    terminated: Vec<u32>,
    snapshots: usize,
}

/// Shorthand for a process row.
pub fn process(pid: u32, name: &str, args: &[&str], owned: bool) -> ProcessInfo {
    ProcessInfo {
        pid,
        name: name.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        owned,
    }
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(mut self, p: ProcessInfo) -> Self {
        self.procs.push(p);
        self
    }

    pub fn with_own_pid(mut self, pid: u32) -> Self {
        self.own_pid = Some(pid);
        self
    }

    /// `pid` ignores SIGTERM.
    pub fn stubborn(mut self, pid: u32) -> Self {
        self.stubborn.insert(pid);
        self
    }

    /// `child` shows up after `parent` is terminated.
    pub fn spawns_on_kill(mut self, parent: u32, child: ProcessInfo) -> Self {
        self.spawned_on_kill.entry(parent).or_default().push(child);
        self
    }

    pub fn terminated(&self) -> &[u32] {
        &self.terminated
    }

    pub fn snapshots(&self) -> usize {
        self.snapshots
    }

    pub fn alive(&self) -> Vec<u32> {
        self.procs.iter().map(|p| p.pid).collect()
    }
}

impl ProcessTable for FakeProcessTable {
    fn snapshot(&mut self) -> Vec<ProcessInfo> {
        self.snapshots += 1;
        self.procs.clone()
    }

    fn terminate(&mut self, pid: u32) -> bool {
        self.terminated.push(pid);
        if !self.procs.iter().any(|p| p.pid == pid) {
            return false;
        }
        if self.stubborn.contains(&pid) {
            return true;
        }
        self.procs.retain(|p| p.pid != pid);
        if let Some(children) = self.spawned_on_kill.remove(&pid) {
            self.procs.extend(children);
        }
        true
    }

    fn own_pid(&self) -> Option<u32> {
        self.own_pid
    }
}
