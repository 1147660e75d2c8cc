// src/launch/detach.rs

//! Starting a process that outlives the invoking terminal session.
//!
//! The child gets its own session (so the terminal's hangup never reaches
//! it), ignores SIGHUP anyway, reads from `/dev/null` and writes stdout and
//! stderr into a transient capture file. That file is the only channel back:
//! anything in it shortly after the start is an early message (usage error,
//! missing dependency); silence means the job is running and talking to its
//! own log.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::{HoldonError, IoContext, Result};

/// A spawned detached process and its capture file.
#[derive(Debug)]
pub struct DetachedJob {
    child: Child,
    capture: NamedTempFile,
}

impl DetachedJob {
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn capture_path(&self) -> PathBuf {
        self.capture.path().to_path_buf()
    }
}

/// What the detached process did during the grace period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EarlyOutcome {
    /// It wrote to stdout/stderr: a message meant for the operator.
    Message { text: String, code: Option<i32> },
    /// It exited with a failure status without saying anything.
    Exited(i32),
    /// Silent and (as far as we can tell) still working.
    Running,
}

#[cfg(unix)]
fn detach_from_terminal() -> std::io::Result<()> {
    use nix::sys::signal::{SigHandler, Signal, signal};

    nix::unistd::setsid()?;
    // SAFETY: installing SIG_IGN does not run any handler code.
    unsafe { signal(Signal::SIGHUP, SigHandler::SigIgn) }?;
    Ok(())
}

/// Spawn `command` (an argv array, no shell involved) detached from the
/// terminal, capturing its early output in a file created in `capture_dir`.
#[cfg(unix)]
pub fn spawn_detached(command: &[OsString], capture_dir: &Path) -> Result<DetachedJob> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| HoldonError::MissingValue("empty command".to_string()))?;

    let capture = tempfile::Builder::new()
        .prefix(".holdon-")
        .suffix(".out")
        .tempfile_in(capture_dir)
        .op("creating capture file", || format!("in {capture_dir:?}"))?;
    let stdout = capture
        .reopen()
        .op("opening capture file", || format!("{:?}", capture.path()))?;
    let stderr = stdout
        .try_clone()
        .op("opening capture file", || format!("{:?}", capture.path()))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(false);

    // SAFETY: the hook only calls async-signal-safe functions (setsid, sigaction).
    unsafe {
        cmd.pre_exec(detach_from_terminal);
    }

    let child = cmd.spawn().map_err(HoldonError::LaunchFailed)?;
    debug!(pid = ?child.id(), program = ?program, "spawned detached process");

    Ok(DetachedJob { child, capture })
}

#[cfg(not(unix))]
pub fn spawn_detached(_command: &[OsString], _capture_dir: &Path) -> Result<DetachedJob> {
    Err(HoldonError::Unsupported(
        "detaching jobs requires a Unix platform; use --foreground".to_string(),
    ))
}

/// Wait `grace`, then decide from the capture file (and exit status) whether
/// the job failed fast. The capture file is removed in every case.
pub async fn peek_early_output(mut job: DetachedJob, grace: Duration) -> Result<EarlyOutcome> {
    sleep(grace).await;

    let path = job.capture_path();
    let bytes = fs::read(&path).op("reading capture file", || format!("{path:?}"))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    let exit = match job.child.try_wait() {
        Ok(status) => status,
        Err(e) => {
            warn!(error = %e, "could not poll detached process");
            None
        }
    };

    if let Err(e) = job.capture.close() {
        warn!(path = ?path, error = %e, "could not remove capture file");
    }

    if !text.trim().is_empty() {
        return Ok(EarlyOutcome::Message {
            text,
            code: exit.and_then(|s| s.code()),
        });
    }

    Ok(match exit {
        Some(status) if !status.success() => EarlyOutcome::Exited(status.code().unwrap_or(-1)),
        _ => EarlyOutcome::Running,
    })
}
