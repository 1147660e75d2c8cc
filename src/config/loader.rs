// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HoldonError, IoContext, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** merge built-ins or
/// compile patterns. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).op("reading config", || format!("{path:?}"))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, merge it over the built-in tools and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration the way the CLI does.
///
/// - An explicit `--config` path must exist.
/// - Without one, `Holdon.toml` in the working directory is used if present,
///   otherwise the built-in profiles alone.
pub fn load_for_cli(explicit: Option<&Path>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(HoldonError::FileNotFound(format!("config file {path:?}")));
            }
            load_and_validate(path)
        }
        None => {
            let path = default_config_path();
            if path.is_file() {
                debug!(config = ?path, "using config from working directory");
                load_and_validate(&path)
            } else {
                debug!("no config file; using built-in tool profiles");
                ConfigFile::builtin()
            }
        }
    }
}

/// Default config location: `Holdon.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Holdon.toml")
}
