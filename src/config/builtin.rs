// src/config/builtin.rs

//! Tool profiles of the pipeline suite, available without any config file.

use std::collections::BTreeMap;

use crate::config::model::ToolConfig;
use crate::types::{CollapseSpec, ItemSource, ReportStyle};

/// Prefix length used to squash RSEM's `ROUND = n, SUM = ...` solver lines.
pub const RSEM_COLLAPSE_PREFIX: usize = 8;

pub fn builtin_tools() -> BTreeMap<String, ToolConfig> {
    let mut tools = BTreeMap::new();

    tools.insert(
        "getFASTQ".to_string(),
        ToolConfig {
            report: ReportStyle::Downloads,
            program: Some("wget".to_string()),
            processes: vec!["wget".to_string()],
            items: Some(ItemSource::Lines("urls.txt".to_string())),
            fan_out: true,
            cmd: vec![
                "wget".to_string(),
                "-c".to_string(),
                "--progress=bar:force".to_string(),
                "-P".to_string(),
                "{dir}".to_string(),
                "{item}".to_string(),
            ],
            ..ToolConfig::default()
        },
    );

    tools.insert(
        "trimFASTQ".to_string(),
        ToolConfig {
            report: ReportStyle::Cycles,
            program: Some("bbduk.sh".to_string()),
            processes: vec!["bbduk".to_string()],
            items: Some(ItemSource::Glob("*_R1*.fastq.gz".to_string())),
            ..ToolConfig::default()
        },
    );

    tools.insert(
        "anqFASTQ".to_string(),
        ToolConfig {
            report: ReportStyle::Cycles,
            program: Some("STAR".to_string()),
            processes: vec!["STAR".to_string(), "rsem-".to_string()],
            items: Some(ItemSource::Glob("*_R1*.fastq.gz".to_string())),
            exclusive: true,
            collapse: Some(CollapseSpec::Prefix(RSEM_COLLAPSE_PREFIX)),
            ..ToolConfig::default()
        },
    );

    tools.insert(
        "FastQC".to_string(),
        ToolConfig {
            report: ReportStyle::Summary,
            program: Some("fastqc".to_string()),
            processes: vec!["fastqc".to_string()],
            done_pattern: Some("^Analysis complete for ".to_string()),
            ..ToolConfig::default()
        },
    );

    tools.insert(
        "MultiQC".to_string(),
        ToolConfig {
            report: ReportStyle::Dump,
            program: Some("multiqc".to_string()),
            processes: vec!["multiqc".to_string()],
            ..ToolConfig::default()
        },
    );

    tools.insert(
        "QualiMap".to_string(),
        ToolConfig {
            report: ReportStyle::Pending,
            program: Some("qualimap".to_string()),
            processes: vec!["qualimap".to_string()],
            ..ToolConfig::default()
        },
    );

    tools.insert(
        "countFASTQ".to_string(),
        ToolConfig {
            report: ReportStyle::Dump,
            program: Some("Rscript".to_string()),
            processes: vec!["Rscript".to_string()],
            ..ToolConfig::default()
        },
    );

    tools
}
