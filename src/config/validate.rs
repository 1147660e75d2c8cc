// src/config/validate.rs

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::builtin::builtin_tools;
use crate::config::model::{ConfigFile, ConfigSection, RawConfigFile, ToolConfig, ToolProfile};
use crate::errors::{HoldonError, Result};
use crate::progress::cycles::Collapse;
use crate::types::{CollapseSpec, ReportStyle};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HoldonError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_global_config(&raw.config)?;

        let mut merged = builtin_tools();
        merged.extend(raw.tool);

        let mut tools = BTreeMap::new();
        for (name, tool) in merged {
            let profile = compile_tool(&name, tool)?;
            tools.insert(name, profile);
        }

        Ok(ConfigFile::new_unchecked(raw.config, tools))
    }
}

fn validate_global_config(cfg: &ConfigSection) -> Result<()> {
    if !is_name_token(&cfg.marker) {
        return Err(HoldonError::ConfigError(format!(
            "[config].marker must be a non-empty token of letters, digits or '-' (got {:?})",
            cfg.marker
        )));
    }

    if cfg.preview_lines == 0 {
        return Err(HoldonError::ConfigError(
            "[config].preview_lines must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.kill_passes == 0 {
        return Err(HoldonError::ConfigError(
            "[config].kill_passes must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn compile_tool(name: &str, tool: ToolConfig) -> Result<ToolProfile> {
    if !is_name_token(name) {
        return Err(HoldonError::ConfigError(format!(
            "tool name '{name}' may only contain letters, digits and '-'"
        )));
    }

    if tool.fan_out && tool.items.is_none() {
        return Err(HoldonError::ConfigError(format!(
            "tool '{name}' sets fan_out but has no `items`"
        )));
    }

    if tool.exclusive && tool.processes.is_empty() {
        return Err(HoldonError::ConfigError(format!(
            "tool '{name}' is exclusive but lists no `processes` to check"
        )));
    }

    let collapse = match tool.collapse {
        None => None,
        Some(_) if tool.report != ReportStyle::Cycles => {
            return Err(HoldonError::ConfigError(format!(
                "tool '{name}': `collapse` only applies to report = \"cycles\""
            )));
        }
        Some(CollapseSpec::Prefix(0)) => {
            return Err(HoldonError::ConfigError(format!(
                "tool '{name}': collapse prefix must be >= 1"
            )));
        }
        Some(CollapseSpec::Prefix(n)) => Some(Collapse::Prefix(n)),
        Some(CollapseSpec::Pattern(ref pat)) => Some(Collapse::Pattern(compile_regex(name, pat)?)),
    };

    let done_pattern = match (tool.report, tool.done_pattern.as_deref()) {
        (ReportStyle::Summary, Some(pat)) => Some(compile_regex(name, pat)?),
        (ReportStyle::Summary, None) => {
            return Err(HoldonError::ConfigError(format!(
                "tool '{name}': report = \"summary\" requires `done_pattern`"
            )));
        }
        (_, Some(_)) => {
            return Err(HoldonError::ConfigError(format!(
                "tool '{name}': `done_pattern` only applies to report = \"summary\""
            )));
        }
        (_, None) => None,
    };

    Ok(ToolProfile {
        name: name.to_string(),
        report: tool.report,
        program: tool.program,
        processes: tool.processes,
        items: tool.items,
        fan_out: tool.fan_out,
        exclusive: tool.exclusive,
        cmd: tool.cmd,
        collapse,
        done_pattern,
    })
}

fn compile_regex(tool: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        HoldonError::ConfigError(format!("tool '{tool}': invalid regex {pattern:?}: {e}"))
    })
}

/// Names end up between `_` separators in log file names, so `_` is excluded.
fn is_name_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemSource;

    fn raw_with(name: &str, tool: ToolConfig) -> RawConfigFile {
        let mut raw = RawConfigFile::default();
        raw.tool.insert(name.to_string(), tool);
        raw
    }

    #[test]
    fn builtin_table_is_valid() {
        let cfg = ConfigFile::builtin().unwrap();
        let names: Vec<&str> = cfg.tools().map(|t| t.name.as_str()).collect();
        for expected in ["getFASTQ", "trimFASTQ", "anqFASTQ", "FastQC", "MultiQC", "QualiMap", "countFASTQ"] {
            assert!(names.contains(&expected), "missing built-in {expected}");
        }
        assert!(cfg.tool("anqFASTQ").unwrap().exclusive);
        assert!(matches!(cfg.tool("anqFASTQ").unwrap().collapse, Some(Collapse::Prefix(8))));
    }

    #[test]
    fn user_tool_replaces_builtin() {
        let raw = raw_with(
            "trimFASTQ",
            ToolConfig {
                report: ReportStyle::Dump,
                cmd: vec!["echo".into(), "{item}".into()],
                ..ToolConfig::default()
            },
        );
        let cfg = ConfigFile::try_from(raw).unwrap();
        let trim = cfg.tool("trimFASTQ").unwrap();
        assert_eq!(trim.report, ReportStyle::Dump);
        assert!(trim.program.is_none());
    }

    #[test]
    fn underscore_in_tool_name_is_rejected() {
        let raw = raw_with("my_tool", ToolConfig::default());
        match ConfigFile::try_from(raw) {
            Err(HoldonError::ConfigError(msg)) => assert!(msg.contains("my_tool")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn summary_requires_done_pattern() {
        let raw = raw_with(
            "qc",
            ToolConfig {
                report: ReportStyle::Summary,
                ..ToolConfig::default()
            },
        );
        assert!(matches!(ConfigFile::try_from(raw), Err(HoldonError::ConfigError(_))));
    }

    #[test]
    fn fan_out_requires_items() {
        let raw = raw_with(
            "dl",
            ToolConfig {
                report: ReportStyle::Downloads,
                fan_out: true,
                ..ToolConfig::default()
            },
        );
        assert!(matches!(ConfigFile::try_from(raw), Err(HoldonError::ConfigError(_))));

        let raw = raw_with(
            "dl",
            ToolConfig {
                report: ReportStyle::Downloads,
                fan_out: true,
                items: Some(ItemSource::Lines("list.txt".into())),
                ..ToolConfig::default()
            },
        );
        assert!(ConfigFile::try_from(raw).is_ok());
    }

    #[test]
    fn bad_collapse_regex_is_a_config_error() {
        let raw = raw_with(
            "anq",
            ToolConfig {
                report: ReportStyle::Cycles,
                collapse: Some(CollapseSpec::Pattern("(unclosed".into())),
                ..ToolConfig::default()
            },
        );
        match ConfigFile::try_from(raw) {
            Err(HoldonError::ConfigError(msg)) => assert!(msg.contains("invalid regex")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn marker_with_underscore_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.config.marker = "Z_".into();
        assert!(matches!(ConfigFile::try_from(raw), Err(HoldonError::ConfigError(_))));
    }
}
