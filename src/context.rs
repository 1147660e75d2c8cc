// src/context.rs

//! Per-invocation state handed to every component explicitly.

use tracing::debug;

use crate::config::{ConfigFile, DependencyTable};
use crate::config::deps::current_host;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct Context {
    pub config: ConfigFile,
    /// Suppresses screen echoes, never log writes or fatal errors.
    pub quiet: bool,
    pub deps: DependencyTable,
    pub host: String,
}

impl Context {
    /// Build a context, loading the dependency descriptor if one is configured.
    pub fn new(config: ConfigFile, quiet: bool) -> Result<Self> {
        let deps = match &config.config.deps_file {
            Some(path) => DependencyTable::load(path)?,
            None => DependencyTable::default(),
        };
        let host = current_host();
        debug!(host = %host, entries = deps.len(), "context ready");

        Ok(Self {
            config,
            quiet,
            deps,
            host,
        })
    }

    pub fn marker(&self) -> &str {
        &self.config.config.marker
    }
}
