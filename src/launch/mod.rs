// src/launch/mod.rs

//! Starting jobs.
//!
//! - [`detach`] spawns a process that survives the terminal and peeks at its
//!   early output.
//! - [`launcher`] is the "hold-on" front: spawn, wait the grace period, report.
//! - [`worker`] is what runs inside the detached process.
//! - [`items`] collects a job's items and expands command templates.
//! - [`motd`] posts a best-effort note while a job runs.

pub mod detach;
pub mod items;
pub mod launcher;
pub mod motd;
pub mod worker;

pub use detach::{DetachedJob, EarlyOutcome, peek_early_output, spawn_detached};
pub use items::{collect_items, expand_command};
pub use launcher::{ImmediateOutcome, LaunchSettings, launch};
pub use worker::{JobSpec, JobSummary, OutputMode, display_argv, run_job};
