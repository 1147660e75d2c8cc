// src/launch/items.rs

//! Job items (one cycle each) and command-template expansion.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use globset::Glob;

use crate::errors::{HoldonError, IoContext, Result};
use crate::types::ItemSource;

/// Items for a job in `dir`, in a stable order.
///
/// - `Glob`: regular files directly in `dir` whose name matches, sorted.
/// - `Lines`: non-empty lines of the list file not starting with `#`, in file order.
/// - `None`: no items; the job is a single run over the directory.
pub fn collect_items(source: Option<&ItemSource>, dir: &Path) -> Result<Vec<String>> {
    match source {
        None => Ok(Vec::new()),
        Some(ItemSource::Glob(pattern)) => glob_items(pattern, dir),
        Some(ItemSource::Lines(file)) => list_items(&dir.join(file)),
    }
}

fn glob_items(pattern: &str, dir: &Path) -> Result<Vec<String>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| HoldonError::InvalidValue(format!("item glob {pattern:?}: {e}")))?
        .compile_matcher();

    let mut items = Vec::new();
    for entry in fs::read_dir(dir).op("listing items", || format!("{dir:?}"))? {
        let entry = entry.op("listing items", || format!("{dir:?}"))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && matcher.is_match(entry.file_name()) {
            items.push(entry.path().to_string_lossy().into_owned());
        }
    }
    items.sort();
    Ok(items)
}

fn list_items(list: &Path) -> Result<Vec<String>> {
    if !list.is_file() {
        return Err(HoldonError::FileNotFound(format!("item list {list:?}")));
    }
    let contents = fs::read_to_string(list).op("reading item list", || format!("{list:?}"))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Expand `{item}`, `{dir}` and `{subject}` inside every argument.
///
/// Substitution happens per argv element, so values containing whitespace
/// stay a single argument. Without an item, `{item}` expands to the directory.
pub fn expand_command(template: &[String], item: Option<&str>, dir: &Path, subject: &str) -> Vec<OsString> {
    let dir_str = dir.to_string_lossy();
    let item_str = item.unwrap_or(&dir_str);

    template
        .iter()
        .map(|arg| {
            OsString::from(
                arg.replace("{item}", item_str)
                    .replace("{dir}", &dir_str)
                    .replace("{subject}", subject),
            )
        })
        .collect()
}
