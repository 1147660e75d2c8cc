// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod joblog;
pub mod launch;
pub mod logging;
pub mod procs;
pub mod progress;
pub mod types;

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ToolProfile, load_for_cli, resolve_program};
use crate::context::Context;
use crate::errors::{HoldonError, IoContext, Result};
use crate::joblog::{JOB_FAILED, LogName, log, subject_from_dir, subject_from_item, tool_glob};
use crate::launch::{
    ImmediateOutcome, JobSpec, LaunchSettings, OutputMode, collect_items, display_argv, launch,
    run_job,
};
use crate::procs::{
    KillOptions, SystemProcessTable, ensure_not_running, kill_all, kill_patterns, worker_tool_arg,
};
use crate::types::{ItemSource, ReportStyle};

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading and the per-invocation [`Context`]
/// - the selected action: workflow, kill, progress, worker, foreground run,
///   or the detached launch
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = load_for_cli(args.config.as_deref())?;
    let ctx = Context::new(config, args.quiet)?;
    let tool = ctx.config.tool(&args.tool)?.clone();
    debug!(tool = %tool.name, "tool profile selected");

    if args.workflow {
        print_workflow(&ctx, &tool);
        return Ok(0);
    }
    if args.kill {
        return run_kill(&ctx, &tool).await;
    }
    if args.progress {
        return run_progress(&ctx, &tool, args.target.as_deref());
    }
    if args.detached {
        return run_worker(&ctx, tool, &args).await;
    }
    if args.foreground {
        return run_foreground(&ctx, &tool, &args).await;
    }
    run_launch(&ctx, &tool, &args).await
}

/// Target directory of a launch: required, must be a directory.
fn require_target(target: Option<&Path>) -> Result<PathBuf> {
    let target = target.ok_or(HoldonError::MissingTarget)?;
    if !target.is_dir() {
        return Err(HoldonError::InvalidTarget(target.to_path_buf()));
    }
    target
        .canonicalize()
        .op("resolving target", || format!("{target:?}"))
}

/// The command from the CLI, else the profile's default.
fn job_command(tool: &ToolProfile, cli_command: &[String]) -> Result<Vec<String>> {
    if !cli_command.is_empty() {
        return Ok(cli_command.to_vec());
    }
    if !tool.cmd.is_empty() {
        return Ok(tool.cmd.clone());
    }
    Err(HoldonError::MissingValue(format!(
        "tool '{}' has no default command; pass one after `--`",
        tool.name
    )))
}

/// One log file and the items its worker processes.
#[derive(Debug, Clone)]
struct PlannedJob {
    log_path: PathBuf,
    items: Vec<String>,
}

/// Check every precondition and work out the logs to create.
///
/// Nothing is started here, so any failure leaves the system untouched.
fn plan_jobs(ctx: &Context, tool: &ToolProfile, target: &Path) -> Result<Vec<PlannedJob>> {
    if let Some(program) = &tool.program {
        resolve_program(&ctx.deps, &ctx.host, program)?;
    }
    ensure_not_running(&mut SystemProcessTable::new(), tool)?;

    let items = collect_items(tool.items.as_ref(), target)?;
    if tool.items.is_some() && items.is_empty() {
        return Err(HoldonError::FileNotFound(format!(
            "no items for {} in {}",
            tool.name,
            target.display()
        )));
    }

    let marker = ctx.marker();
    let planned: Vec<PlannedJob> = if tool.fan_out {
        items
            .into_iter()
            .map(|item| PlannedJob {
                log_path: LogName::now(marker, &tool.name, &subject_from_item(&item)).path_in(target),
                items: vec![item],
            })
            .collect()
    } else {
        vec![PlannedJob {
            log_path: LogName::now(marker, &tool.name, &subject_from_dir(target)).path_in(target),
            items,
        }]
    };

    let mut seen = BTreeSet::new();
    for job in &planned {
        if job.log_path.exists() || !seen.insert(job.log_path.clone()) {
            return Err(HoldonError::OverwritePrevented(job.log_path.clone()));
        }
    }

    Ok(planned)
}

fn current_exe() -> Result<PathBuf> {
    std::env::current_exe().op("locating own executable", || "current_exe".to_string())
}

/// Arguments that make a copy of this binary run one job as a worker.
fn worker_argv(
    exe: &Path,
    tool: &ToolProfile,
    args: &CliArgs,
    target: &Path,
    job: &PlannedJob,
    command: &[String],
) -> Result<Vec<OsString>> {
    let mut argv: Vec<OsString> = vec![
        exe.into(),
        "--detached".into(),
        worker_tool_arg(&tool.name).into(),
        "--log".into(),
        job.log_path.clone().into(),
    ];
    if let Some(config) = &args.config {
        let abs = std::path::absolute(config).op("resolving config path", || format!("{config:?}"))?;
        argv.push("--config".into());
        argv.push(abs.into());
    }
    if let Some(level) = args.log_level {
        argv.push("--log-level".into());
        argv.push(level.as_str().into());
    }
    for item in &job.items {
        argv.push("--item".into());
        argv.push(item.into());
    }
    argv.push(target.into());
    argv.push("--".into());
    argv.extend(command.iter().map(OsString::from));
    Ok(argv)
}

async fn run_launch(ctx: &Context, tool: &ToolProfile, args: &CliArgs) -> Result<i32> {
    let target = require_target(args.target.as_deref())?;
    let command = job_command(tool, &args.command)?;
    let jobs = plan_jobs(ctx, tool, &target)?;
    let exe = current_exe()?;

    let settings = LaunchSettings {
        grace: ctx.config.config.grace(),
        log_wait: ctx.config.config.log_wait(),
        preview_lines: ctx.config.config.preview_lines,
        quiet: ctx.quiet,
    };

    let mut code = 0;
    for job in &jobs {
        let argv = worker_argv(&exe, tool, args, &target, job, &command)?;
        match launch(&job.log_path, &argv, &settings).await? {
            ImmediateOutcome::Scheduled { pid, .. } => {
                info!(tool = %tool.name, log = ?job.log_path, pid = ?pid, "job running in background");
            }
            ImmediateOutcome::EarlyExit { code: Some(c), .. } if c != 0 => {
                warn!(tool = %tool.name, log = ?job.log_path, code = c, "job ended during the grace period");
                if code == 0 {
                    code = c;
                }
            }
            ImmediateOutcome::EarlyExit { .. } => {}
        }
    }
    Ok(code)
}

async fn run_foreground(ctx: &Context, tool: &ToolProfile, args: &CliArgs) -> Result<i32> {
    let target = require_target(args.target.as_deref())?;
    let command = job_command(tool, &args.command)?;
    let jobs = plan_jobs(ctx, tool, &target)?;
    let mode = OutputMode::Stream { echo: !ctx.quiet };

    let mut code = 0;
    for planned in jobs {
        let job = JobSpec {
            tool: tool.clone(),
            target: target.clone(),
            log_path: planned.log_path,
            command: command.clone(),
            items: planned.items,
        };
        let summary = run_job(ctx, &job, mode).await?;
        if code == 0 {
            code = summary.exit_code();
        }
    }
    Ok(code)
}

/// Hidden worker mode: the process the launcher detached.
///
/// Its stdout/stderr are the launcher's capture file, so nothing may be
/// printed here unless it is meant as an early failure message.
async fn run_worker(ctx: &Context, tool: ToolProfile, args: &CliArgs) -> Result<i32> {
    let log_path = args
        .log
        .clone()
        .ok_or_else(|| HoldonError::MissingValue("--log".to_string()))?;
    let target = require_target(args.target.as_deref())?;
    let command = job_command(&tool, &args.command)?;

    let job = JobSpec {
        tool,
        target,
        log_path,
        command,
        items: args.items.clone(),
    };

    match run_job(ctx, &job, OutputMode::Append).await {
        Ok(summary) => Ok(summary.exit_code()),
        Err(err) => {
            // Past the grace period nobody reads our stderr; leave a trace
            // in the log the reporter looks at.
            record_worker_failure(&job.log_path, &err);
            Err(err)
        }
    }
}

/// Append a failure banner to a worker's log, if the log was started.
fn record_worker_failure(log_path: &Path, err: &HoldonError) {
    if !log_path.exists() {
        return;
    }
    let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    if let Err(e) = log(false, log_path, &[format!("{JOB_FAILED} {ts} ({err})")]) {
        warn!(log = ?log_path, error = %e, "could not record the failure in the job log");
    }
}

fn run_progress(ctx: &Context, tool: &ToolProfile, target: Option<&Path>) -> Result<i32> {
    let dir = target.unwrap_or_else(|| Path::new("."));
    if !dir.is_dir() {
        return Err(HoldonError::InvalidTarget(dir.to_path_buf()));
    }

    let report = progress::report(tool, ctx.marker(), dir)?;
    print!("{report}");
    Ok(0)
}

async fn run_kill(ctx: &Context, tool: &ToolProfile) -> Result<i32> {
    let exe = current_exe()?;
    let worker_name = exe
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "holdon".to_string());
    let patterns = kill_patterns(tool, &worker_name)?;

    let opts = KillOptions {
        max_passes: ctx.config.config.kill_passes,
        pause: ctx.config.config.kill_pause(),
    };
    let mut table = SystemProcessTable::new();
    let summary = kill_all(&mut table, &patterns, &opts).await;

    if !ctx.quiet {
        if summary.signalled.is_empty() {
            println!("no running processes for {}", tool.name);
        } else {
            println!(
                "terminated {} process(es) for {} in {} pass(es):",
                summary.signalled.len(),
                tool.name,
                summary.passes
            );
            for (pid, name) in &summary.signalled {
                println!("  {pid} {name}");
            }
        }
        if summary.exhausted {
            println!("some processes were still running after {} passes", summary.passes);
        }
    }
    Ok(0)
}

/// Print the tool profile: what a launch would do, without doing it.
fn print_workflow(ctx: &Context, tool: &ToolProfile) {
    println!("holdon workflow: {}", tool.name);
    println!("  report: {}", tool.report);
    if let Some(program) = &tool.program {
        println!("  program: {program}");
    }
    if !tool.processes.is_empty() {
        println!("  processes: {:?}", tool.processes);
    }
    match &tool.items {
        Some(ItemSource::Glob(pattern)) => println!("  items: files matching {pattern}"),
        Some(ItemSource::Lines(file)) => println!("  items: lines of {file}"),
        None => println!("  items: none (one run over TARGET)"),
    }
    if tool.fan_out {
        println!("  fan_out: one detached job and log per item");
    }
    if tool.exclusive {
        println!("  exclusive: refuses to start while {:?} is running", tool.processes);
    }
    if tool.cmd.is_empty() {
        println!("  cmd: (none; pass one after `--`)");
    } else {
        println!("  cmd: {}", display_argv(&tool.cmd));
    }
    if let Some(collapse) = &tool.collapse {
        println!("  collapse: {collapse}");
    }
    if tool.report == ReportStyle::Summary {
        if let Some(done) = &tool.done_pattern {
            println!("  done_pattern: {}", done.as_str());
        }
    }
    println!(
        "  logs: {}",
        tool_glob(ctx.marker(), &tool.name).replace('*', "<subject>_<yyyy.mm.dd_HH.MM.SS>")
    );

    debug!("workflow printed (no execution)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joblog::JobLogger;

    #[test]
    fn worker_failure_is_appended_to_a_started_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Z_sleeper_run_2024.01.01_10.00.00.log");
        std::fs::write(&path, "holdon: job started 2024-01-01 10:00:00\n").unwrap();

        record_worker_failure(&path, &HoldonError::MissingTarget);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().last().unwrap().starts_with(JOB_FAILED));

        let absent = dir.path().join("Z_sleeper_other_2024.01.01_10.00.00.log");
        record_worker_failure(&absent, &HoldonError::MissingTarget);
        assert!(!absent.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unwritable_log_is_reported_not_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let diagnostics = dir.path().join("diagnostics.log");
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(JobLogger::new(&diagnostics, false))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            record_worker_failure(Path::new("/dev/full"), &HoldonError::MissingTarget);
        });

        let text = std::fs::read_to_string(&diagnostics).unwrap();
        assert!(text.contains("could not record the failure in the job log"));
    }
}
