// tests/progress_cycles.rs

mod common;

use common::{LogDirBuilder, builtin};
use holdon::joblog::cycle_block;
use holdon::progress::report;
use holdon::types::JobState;

fn rsem_two_cycle_log(finished: bool) -> String {
    let mut lines: Vec<String> = vec![
        "holdon: job started 2024-01-01 10:00:00".into(),
        "tool: anqFASTQ".into(),
        "target: /data/run1".into(),
        "command: run-anq.sh {item}".into(),
        "items: 2".into(),
    ];
    lines.extend(cycle_block(1, 2, "/data/run1/S1_R1.fastq.gz"));
    lines.extend([
        "STAR --runMode alignReads".to_string(),
        "ROUND = 1, SUM = 1000, bChange = 0.9".to_string(),
        "ROUND = 2, SUM = 1000, bChange = 0.2".to_string(),
        "ROUND = 3, SUM = 1000, bChange = 0.001".to_string(),
        "Expression Results are written!".to_string(),
    ]);
    lines.extend(cycle_block(2, 2, "/data/run1/S2_R1.fastq.gz"));
    lines.extend([
        "STAR --runMode alignReads".to_string(),
        "ROUND = 1, SUM = 2000, bChange = 0.8".to_string(),
        "ROUND = 2, SUM = 2000, bChange = 0.3".to_string(),
    ]);
    if finished {
        lines.push("holdon: job completed 2024-01-01 12:00:00".into());
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[test]
fn two_cycle_rsem_log_starts_at_first_cycle_block() {
    let dir = LogDirBuilder::new()
        .log("Z_anqFASTQ_run1_2024.01.01_10.00.00.log", &rsem_two_cycle_log(false), 10)
        .build();

    let r = report(&builtin("anqFASTQ"), "Z", dir.path()).unwrap();
    let body: Vec<&str> = r.body.lines().collect();

    assert_eq!(r.state, JobState::InProgress);
    assert!(body[0].starts_with("====="));
    assert_eq!(body[1], "Cycle 1/2: /data/run1/S1_R1.fastq.gz");
    assert!(!r.body.contains("holdon: job started"));

    // ROUND runs collapse to their last line.
    assert!(!r.body.contains("ROUND = 1, SUM = 1000"));
    assert!(r.body.contains("ROUND = 3, SUM = 1000, bChange = 0.001"));
    assert!(r.body.contains("ROUND = 2, SUM = 2000, bChange = 0.3"));
    assert!(r.headline.contains("anqFASTQ job in progress"));
    assert!(r.headline.contains("Z_anqFASTQ_run1_2024.01.01_10.00.00.log"));
}

#[test]
fn finished_job_is_completed_and_report_is_idempotent() {
    let dir = LogDirBuilder::new()
        .log("Z_anqFASTQ_run1_2024.01.01_10.00.00.log", &rsem_two_cycle_log(true), 10)
        .build();
    let tool = builtin("anqFASTQ");

    let first = report(&tool, "Z", dir.path()).unwrap();
    let second = report(&tool, "Z", dir.path()).unwrap();

    assert_eq!(first.state, JobState::Completed);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn trim_report_without_collapse_keeps_every_line() {
    let mut log = String::from("holdon: job started 2024-01-01 10:00:00\n");
    for l in cycle_block(1, 1, "S1_R1.fastq.gz") {
        log.push_str(&l);
        log.push('\n');
    }
    log.push_str("Input:  100 reads\nInput:  100 reads\n");

    let dir = LogDirBuilder::new()
        .log("Z_trimFASTQ_run_2024.01.01_10.00.00.log", &log, 10)
        .build();
    let r = report(&builtin("trimFASTQ"), "Z", dir.path()).unwrap();

    assert_eq!(r.body.matches("Input:  100 reads").count(), 2);
}

#[test]
fn failed_banner_wins_over_started() {
    let log = "holdon: job started 2024-01-01 10:00:00\n\
               holdon: cycle 1/1 exited with status 2\n\
               holdon: job failed 2024-01-01 10:05:00 (1 of 1 cycles failed)\n";
    let dir = LogDirBuilder::new()
        .log("Z_trimFASTQ_run_2024.01.01_10.00.00.log", log, 10)
        .build();

    let r = report(&builtin("trimFASTQ"), "Z", dir.path()).unwrap();
    assert_eq!(r.state, JobState::Failed);
}

#[test]
fn anq_failure_report_names_the_failed_cycle() {
    let mut log = rsem_two_cycle_log(false);
    log.push_str("holdon: cycle 2/2 exited with status 1\n");
    log.push_str("holdon: job failed 2024-01-01 12:00:00 (1 of 2 cycles failed)\n");
    let dir = LogDirBuilder::new()
        .log("Z_anqFASTQ_run1_2024.01.01_10.00.00.log", &log, 10)
        .build();

    let r = report(&builtin("anqFASTQ"), "Z", dir.path()).unwrap();

    assert_eq!(r.state, JobState::Failed);
    assert!(r.body.contains("holdon: cycle 2/2 exited with status 1\n"));
    assert!(r.body.contains("holdon: job failed 2024-01-01 12:00:00 (1 of 2 cycles failed)"));
}

#[test]
fn summary_lists_finished_analyses() {
    let log = "holdon: job started 2024-01-01 10:00:00\n\
               Started analysis of S1_R1.fastq.gz\n\
               Analysis complete for S1_R1.fastq.gz\n\
               Started analysis of S2_R1.fastq.gz\n\
               Approx 40% complete for S2_R1.fastq.gz\n";
    let dir = LogDirBuilder::new()
        .log("Z_FastQC_run_2024.01.01_10.00.00.log", log, 10)
        .build();

    let r = report(&builtin("FastQC"), "Z", dir.path()).unwrap();

    assert!(r.body.contains("  Analysis complete for S1_R1.fastq.gz\n"));
    assert!(r.body.contains("Last: Approx 40% complete for S2_R1.fastq.gz"));
}

#[test]
fn summary_without_finished_items_says_so() {
    let dir = LogDirBuilder::new()
        .log("Z_FastQC_run_2024.01.01_10.00.00.log", "holdon: job started x\n", 10)
        .build();

    let r = report(&builtin("FastQC"), "Z", dir.path()).unwrap();
    assert!(r.body.contains("  no completed items"));
}

#[test]
fn dump_and_pending_styles() {
    let log = "holdon: job started 2024-01-01 10:00:00\n[INFO] multiqc: Search path\n";
    let dir = LogDirBuilder::new()
        .log("Z_MultiQC_run_2024.01.01_10.00.00.log", log, 10)
        .log("Z_QualiMap_run_2024.01.01_10.00.00.log", log, 10)
        .build();

    let dump = report(&builtin("MultiQC"), "Z", dir.path()).unwrap();
    assert_eq!(dump.body, log);

    let pending = report(&builtin("QualiMap"), "Z", dir.path()).unwrap();
    assert_eq!(pending.body, "progress report for QualiMap is not yet implemented\n");
}

#[test]
fn rendered_report_separates_headline_and_body() {
    let dir = LogDirBuilder::new()
        .log("Z_MultiQC_run_2024.01.01_10.00.00.log", "only line", 10)
        .build();

    let text = report(&builtin("MultiQC"), "Z", dir.path()).unwrap().to_string();
    let (headline, rest) = text.split_once("\n\n").unwrap();

    assert!(headline.starts_with("MultiQC job unknown"));
    assert_eq!(rest, "only line\n");
}
