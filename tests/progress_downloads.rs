// tests/progress_downloads.rs

mod common;

use common::{LogDirBuilder, builtin, init_tracing};
use holdon::errors::HoldonError;
use holdon::progress::report;
use holdon::types::JobState;

const SAVED: &str = "--2024-01-01 10:00:00--  ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR1/SRR1_1.fastq.gz\n\
                     Length: 1234567 (1.2M)\n\
                     2024-01-01 10:00:09 (1.1 MB/s) - 'SRR1_1.fastq.gz' saved [1234567]\n";

const UNRESOLVED: &str = "--2024-01-01 10:00:00--  ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR2/SRR2_1.fastq.gz\n\
                          wget: unable to resolve host address 'ftp.sra.ebi.ac.uk'\n";

#[test]
fn single_saved_download_is_one_completed_item() {
    init_tracing();
    let dir = LogDirBuilder::new()
        .log("Z_getFASTQ_SRR1_2024.01.01_10.00.00.log", SAVED, 10)
        .build();

    let r = report(&builtin("getFASTQ"), "Z", dir.path()).unwrap();

    assert_eq!(r.state, JobState::Completed);
    assert!(r.headline.contains("1 completed, 0 failed, 0 incoming"), "{}", r.headline);
    assert!(r.body.contains("  SRR1: 2024-01-01 10:00:09 (1.1 MB/s) - 'SRR1_1.fastq.gz' saved [1234567]"));
    assert!(r.body.contains("  no failed items"));
    assert!(r.body.contains("  no incoming items"));
}

#[test]
fn only_failed_downloads_still_print_empty_buckets() {
    let dir = LogDirBuilder::new()
        .log("Z_getFASTQ_SRR2_2024.01.01_10.00.00.log", UNRESOLVED, 10)
        .log("Z_getFASTQ_SRR3_2024.01.01_10.00.01.log", "Connection terminated by peer\n", 20)
        .build();

    let r = report(&builtin("getFASTQ"), "Z", dir.path()).unwrap();
    let text = r.to_string();

    assert_eq!(r.state, JobState::Failed);
    assert!(text.contains("  no completed items"));
    assert!(text.contains("  no incoming items"));
    assert!(text.contains("  SRR2: wget: unable to resolve host address 'ftp.sra.ebi.ac.uk'"));
    assert!(text.contains("  SRR3: Connection terminated by peer"));
    assert!(!text.contains("no failed items"));
}

#[test]
fn partial_download_is_incoming_and_echoes_its_progress_line() {
    let content = "--2024-01-01 10:00:00--  ftp://host/sample1.fastq.gz\n\
                   Length: 2743610 (2.6M)\n\
                   \r 12%[>           ] 329233\r45%[====>    ] 1234567";
    let dir = LogDirBuilder::new()
        .log("Z_getFASTQ_sample1_2024.01.01_10.00.00.log", content, 10)
        .build();

    let r = report(&builtin("getFASTQ"), "Z", dir.path()).unwrap();

    assert_eq!(r.state, JobState::InProgress);
    assert!(r.body.contains("Incoming:\n  sample1: 45%[====>    ] 1234567\n"), "{}", r.body);
    assert!(r.body.contains("  no completed items"));
}

#[test]
fn unclassifiable_log_is_reported_as_a_warning_line() {
    let dir = LogDirBuilder::new()
        .log("Z_getFASTQ_odd_2024.01.01_10.00.00.log", "something else entirely\n", 10)
        .build();

    let r = report(&builtin("getFASTQ"), "Z", dir.path()).unwrap();

    assert_eq!(r.state, JobState::Unknown);
    assert!(r.body.contains("WARNING: cannot classify Z_getFASTQ_odd_2024.01.01_10.00.00.log"));
}

#[test]
fn other_tools_and_markers_are_ignored() {
    let dir = LogDirBuilder::new()
        .log("Z_trimFASTQ_run_2024.01.01_10.00.00.log", SAVED, 10)
        .log("Y_getFASTQ_SRR1_2024.01.01_10.00.00.log", SAVED, 10)
        .build();

    match report(&builtin("getFASTQ"), "Z", dir.path()) {
        Err(HoldonError::NoLogFound { pattern, .. }) => assert_eq!(pattern, "Z_getFASTQ_*.log"),
        other => panic!("expected NoLogFound, got {other:?}"),
    }
}
