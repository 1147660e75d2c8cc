// tests/error_handling.rs

use std::io::Write;

use holdon::config::{load_and_validate, load_for_cli};
use holdon::errors::HoldonError;
use holdon::types::{ItemSource, ReportStyle};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn user_tool_overrides_builtin_and_adds_new_tools() {
    let file = config_file(
        r#"
[config]
marker = "A"
grace_ms = 50

[tool.trimFASTQ]
report = "cycles"
program = "bbduk.sh"
processes = ["bbduk"]
items = { glob = "*.fq.gz" }
cmd = ["bbduk.sh", "in={item}", "out={dir}/trimmed/{subject}.fq.gz"]
collapse = { pattern = "^\\d+% done" }

[tool.kallisto]
report = "dump"
cmd = ["kallisto", "quant", "{dir}"]
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.config.marker, "A");
    assert_eq!(cfg.config.grace_ms, 50);
    assert_eq!(cfg.config.preview_lines, 12);

    let trim = cfg.tool("trimFASTQ").unwrap();
    assert_eq!(trim.items, Some(ItemSource::Glob("*.fq.gz".into())));
    assert!(trim.collapse.is_some());

    assert_eq!(cfg.tool("kallisto").unwrap().report, ReportStyle::Dump);
    // Untouched built-ins survive.
    assert!(cfg.tool("getFASTQ").unwrap().fan_out);
}

#[test]
fn summary_without_done_pattern_is_a_config_error() {
    let file = config_file(
        r#"
[tool.fastp]
report = "summary"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HoldonError::ConfigError(msg)) => {
            assert!(msg.contains("fastp"));
            assert!(msg.contains("done_pattern"));
        }
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_collapse_regex_is_reported_with_the_tool_name() {
    let file = config_file(
        r#"
[tool.trimFASTQ]
report = "cycles"
collapse = { pattern = "(unclosed" }
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert_eq!(err.exit_code(), 102);
    assert!(err.to_string().contains("trimFASTQ"));
}

#[test]
fn unknown_keys_and_bad_toml_are_rejected() {
    let file = config_file("[config]\ncolour = \"blue\"\n");
    assert!(matches!(load_and_validate(file.path()), Err(HoldonError::TomlError(_))));

    let file = config_file("[tool.x\n");
    assert_eq!(load_and_validate(file.path()).unwrap_err().exit_code(), 102);
}

#[test]
fn explicit_missing_config_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_for_cli(Some(&dir.path().join("Holdon.toml"))).unwrap_err();
    assert_eq!(err.exit_code(), 15);
}

#[test]
fn unknown_tool_is_unsupported() {
    let cfg = holdon::config::ConfigFile::builtin().unwrap();
    let err = cfg.tool("salmonQuant").unwrap_err();

    assert_eq!(err.exit_code(), 14);
    assert!(err.to_string().contains("anqFASTQ"));
}
