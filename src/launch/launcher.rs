// src/launch/launcher.rs

//! The "hold-on" launcher: schedule a job in the background and return
//! quickly with either its early message or a preview of its log.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::errors::{IoContext, Result};
use crate::launch::detach::{EarlyOutcome, peek_early_output, spawn_detached};

const LOG_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub grace: Duration,
    pub log_wait: Duration,
    pub preview_lines: usize,
    pub quiet: bool,
}

/// What the invoking call learned before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmediateOutcome {
    /// The job stopped (or spoke up) during the grace period; its message was
    /// printed. `code` is its exit status when already known.
    EarlyExit { message: Option<String>, code: Option<i32> },
    /// The job is running in the background.
    Scheduled { pid: Option<u32>, preview: Vec<String> },
}

/// Launch `command` detached; it is expected to log only to `log_path`.
pub async fn launch(
    log_path: &Path,
    command: &[OsString],
    settings: &LaunchSettings,
) -> Result<ImmediateOutcome> {
    let capture_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let job = spawn_detached(command, capture_dir)?;
    let pid = job.pid();

    match peek_early_output(job, settings.grace).await? {
        EarlyOutcome::Message { text, code } => {
            // Early messages are fatal/usage output: never silenced by quiet.
            print_stdout(&text)?;
            Ok(ImmediateOutcome::EarlyExit {
                message: Some(text),
                code,
            })
        }
        EarlyOutcome::Exited(code) => {
            println!("job exited immediately with status {code} (see {})", log_path.display());
            Ok(ImmediateOutcome::EarlyExit {
                message: None,
                code: Some(code),
            })
        }
        EarlyOutcome::Running => {
            info!(pid = ?pid, log = ?log_path, "job scheduled");
            let preview = wait_for_preview(log_path, settings).await?;
            if !settings.quiet {
                print_preview(log_path, pid, &preview)?;
            }
            Ok(ImmediateOutcome::Scheduled { pid, preview })
        }
    }
}

/// Poll until the log exists (up to `log_wait`) and return its first lines.
async fn wait_for_preview(log_path: &Path, settings: &LaunchSettings) -> Result<Vec<String>> {
    let deadline = Instant::now() + settings.log_wait;

    loop {
        if log_path.is_file() {
            let bytes = fs::read(log_path).op("reading job log", || format!("{log_path:?}"))?;
            let text = String::from_utf8_lossy(&bytes);
            return Ok(text
                .lines()
                .take(settings.preview_lines)
                .map(str::to_string)
                .collect());
        }
        if Instant::now() >= deadline {
            debug!(log = ?log_path, "log did not appear before the wait ran out");
            return Ok(Vec::new());
        }
        sleep(LOG_POLL_INTERVAL).await;
    }
}

fn print_preview(log_path: &Path, pid: Option<u32>, preview: &[String]) -> Result<()> {
    let mut out = String::new();
    match pid {
        Some(pid) => out.push_str(&format!("Scheduled job (pid {pid}), logging to {}\n", log_path.display())),
        None => out.push_str(&format!("Scheduled job, logging to {}\n", log_path.display())),
    }
    if preview.is_empty() {
        out.push_str("  (log not written yet; check again with --progress)\n");
    }
    for line in preview {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    print_stdout(&out)
}

fn print_stdout(text: &str) -> Result<()> {
    let write = || -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()
    };
    write().op("writing to stdout", || "launcher output".to_string())
}
