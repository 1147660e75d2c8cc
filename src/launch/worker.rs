// src/launch/worker.rs

//! The detached side of a job: run the tool's command once per item and
//! narrate everything into the job log.
//!
//! The log is the only thing `--progress` ever looks at, so every state
//! change the reporter cares about is written here as a banner line:
//!
//! - `holdon: job started <ts>` first,
//! - a marker block before each item,
//! - `holdon: cycle i/N exited with status S` after a failing cycle,
//! - `holdon: job completed <ts>` or `holdon: job failed <ts> (K of N cycles failed)` last.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{ToolProfile, resolve_program};
use crate::context::Context;
use crate::errors::{HoldonError, IoContext, Result};
use crate::joblog::{
    CANNOT_START, JOB_COMPLETED, JOB_FAILED, JOB_STARTED, JobLogger, cycle_block, subject_from_dir,
    subject_from_item,
};
use crate::launch::items::expand_command;
use crate::launch::motd::MotdNote;

const BANNER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where the wrapped program's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// stdout/stderr appended straight to the log file (detached worker).
    Append,
    /// Lines streamed through the Logger, echoed to the screen if `echo`.
    Stream { echo: bool },
}

impl OutputMode {
    fn echo(self) -> bool {
        matches!(self, OutputMode::Stream { echo: true })
    }
}

#[derive(Debug, Clone)]
pub struct JobSpec {
    pub tool: ToolProfile,
    pub target: PathBuf,
    pub log_path: PathBuf,
    /// Command template; placeholders are expanded per item.
    pub command: Vec<String>,
    /// One cycle per item. Empty means a single run over the target.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub cycles: usize,
    pub failed: usize,
}

impl JobSummary {
    pub fn succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.succeeded() { 0 } else { 1 }
    }
}

fn banner_time() -> String {
    Local::now().format(BANNER_TIME_FORMAT).to_string()
}

/// Render an argv for humans: arguments with whitespace are quoted.
pub fn display_argv<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|a| {
            let a = a.as_ref();
            if a.is_empty() || a.chars().any(char::is_whitespace) {
                format!("{a:?}")
            } else {
                a.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run every cycle of `job`, writing banners and program output to its log.
///
/// A dependency that cannot be resolved fails the job before anything is
/// logged. A failing cycle does not stop the following ones.
pub async fn run_job(ctx: &Context, job: &JobSpec, mode: OutputMode) -> Result<JobSummary> {
    if let Some(program) = &job.tool.program {
        let path = resolve_program(&ctx.deps, &ctx.host, program)?;
        debug!(program = %program, path = ?path, "dependency resolved");
    }
    if job.command.is_empty() {
        return Err(HoldonError::MissingValue(format!(
            "no command to run for tool '{}'",
            job.tool.name
        )));
    }

    let logger = JobLogger::new(&job.log_path, mode.echo());
    let mut header = vec![
        format!("{JOB_STARTED} {}", banner_time()),
        format!("tool: {}", job.tool.name),
        format!("target: {}", job.target.display()),
        format!("command: {}", display_argv(&job.command)),
    ];
    if !job.items.is_empty() {
        header.push(format!("items: {}", job.items.len()));
    }
    logger.lines(&header)?;

    let motd = ctx.config.config.motd.as_deref().and_then(|path| {
        MotdNote::post(
            path,
            format!(
                "holdon: {} running in {} (pid {})",
                job.tool.name,
                job.target.display(),
                std::process::id()
            ),
        )
    });

    let result = run_cycles(&logger, job, mode).await;

    if let Some(note) = motd {
        note.clear();
    }
    let summary = result?;

    // A detached worker's diagnostics share the log; the final banner must
    // stay its last line.
    info!(
        tool = %job.tool.name,
        log = ?job.log_path,
        cycles = summary.cycles,
        failed = summary.failed,
        "job finished"
    );
    if summary.succeeded() {
        logger.line(format!("{JOB_COMPLETED} {}", banner_time()))?;
    } else {
        logger.line(format!(
            "{JOB_FAILED} {} ({} of {} cycles failed)",
            banner_time(),
            summary.failed,
            summary.cycles
        ))?;
    }

    Ok(summary)
}

async fn run_cycles(logger: &JobLogger, job: &JobSpec, mode: OutputMode) -> Result<JobSummary> {
    let runs: Vec<Option<&str>> = if job.items.is_empty() {
        vec![None]
    } else {
        job.items.iter().map(|i| Some(i.as_str())).collect()
    };
    let total = runs.len();
    let dir_subject = subject_from_dir(&job.target);
    let mut summary = JobSummary {
        cycles: total,
        failed: 0,
    };

    for (idx, item) in runs.into_iter().enumerate() {
        let index = idx + 1;
        let subject = match item {
            Some(item) => {
                logger.lines(&cycle_block(index, total, item))?;
                subject_from_item(item)
            }
            None => dir_subject.clone(),
        };

        let argv = expand_command(&job.command, item, &job.target, &subject);
        debug!(item = ?item, cycle = index, total, "starting cycle");

        match run_cycle(logger, &argv, &job.target, mode).await? {
            Some(0) => {}
            Some(code) => {
                summary.failed += 1;
                logger.line(format!("holdon: cycle {index}/{total} exited with status {code}"))?;
                warn!(item = ?item, cycle = index, code, "cycle failed");
            }
            None => summary.failed += 1,
        }
    }

    Ok(summary)
}

/// Run one command to completion. `None` means it could not be started
/// (already logged); otherwise its exit code (`-1` when killed by a signal).
async fn run_cycle(
    logger: &JobLogger,
    argv: &[OsString],
    dir: &Path,
    mode: OutputMode,
) -> Result<Option<i32>> {
    let Some((program, args)) = argv.split_first() else {
        return Err(HoldonError::MissingValue("empty command".to_string()));
    };

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir).stdin(Stdio::null());

    match mode {
        OutputMode::Append => {
            let path = logger.path();
            let out = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .op("opening log for program output", || format!("{path:?}"))?;
            let err = out
                .try_clone()
                .op("opening log for program output", || format!("{path:?}"))?;
            cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
        }
        OutputMode::Stream { .. } => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            let name = program.to_string_lossy();
            logger.line(format!("{CANNOT_START} {name}: {e}"))?;
            warn!(program = %name, error = %e, "could not start program");
            return Ok(None);
        }
    };

    if let OutputMode::Stream { .. } = mode {
        let stderr_task = child.stderr.take().map(|stderr| {
            let logger = logger.clone();
            tokio::spawn(async move { forward_lines(&logger, stderr).await })
        });
        if let Some(stdout) = child.stdout.take() {
            forward_lines(logger, stdout).await?;
        }
        if let Some(task) = stderr_task {
            task.await.map_err(anyhow::Error::from)??;
        }
    }

    let status = child
        .wait()
        .await
        .op("waiting for program", || program.to_string_lossy().into_owned())?;
    Ok(Some(status.code().unwrap_or(-1)))
}

async fn forward_lines<R>(logger: &JobLogger, stream: R) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .op("reading program output", || format!("{:?}", logger.path()))?
    {
        logger.line(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_display_quotes_whitespace() {
        let shown = display_argv(&["wget", "-P", "/data/my run", ""]);
        assert_eq!(shown, r#"wget -P "/data/my run" """#);
    }

    #[test]
    fn summary_exit_code() {
        assert_eq!(JobSummary { cycles: 3, failed: 0 }.exit_code(), 0);
        assert_eq!(JobSummary { cycles: 3, failed: 1 }.exit_code(), 1);
    }
}
