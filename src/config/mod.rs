// src/config/mod.rs

//! Configuration loading and validation for holdon.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Provide the built-in tool profiles of the pipeline suite (`builtin.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate and compile it into ready-to-use [`ToolProfile`]s (`validate.rs`).
//! - Parse the host dependency descriptor file (`deps.rs`).

pub mod builtin;
pub mod deps;
pub mod loader;
pub mod model;
pub mod validate;

pub use deps::{DependencyTable, resolve_program};
pub use loader::{load_and_validate, load_for_cli, load_from_path};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, ToolConfig, ToolProfile};
