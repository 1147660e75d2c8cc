#![allow(dead_code)]

use holdon::config::{ConfigFile, ToolProfile};

pub use holdon_test_utils::builders::{ConfigFileBuilder, LogDirBuilder, tool};
pub use holdon_test_utils::init_tracing;

pub fn builtin(name: &str) -> ToolProfile {
    ConfigFile::builtin()
        .expect("built-in profiles are valid")
        .tool(name)
        .expect("built-in tool exists")
        .clone()
}
