// src/progress/mod.rs

//! `--progress`: heuristic job-state reporting from log files alone.
//!
//! - [`rules`] holds the ordered classification tables.
//! - [`cycles`] extracts the last complete cycle and squashes repeated lines.
//! - [`downloads`] classifies parallel download logs into buckets.
//! - [`report`] picks the log(s) and renders per [`crate::types::ReportStyle`].

pub mod cycles;
pub mod downloads;
pub mod report;
pub mod rules;

pub use cycles::Collapse;
pub use report::{RenderedReport, report};
pub use rules::{Probe, Rule, RuleTable};
