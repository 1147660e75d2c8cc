// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every suite tool shares this surface; `--tool` selects the profile.
//! Parse failures are mapped onto the numbered exit codes of
//! [`HoldonError`] instead of clap's own `2`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Parser, ValueEnum};

use crate::errors::HoldonError;

/// Command-line arguments for `holdon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "holdon",
    version,
    about = "Run pipeline jobs in the background and report their progress from their logs.",
    long_about = None,
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Tool profile to use (e.g. getFASTQ, trimFASTQ, anqFASTQ).
    #[arg(short = 't', long, value_name = "NAME")]
    pub tool: String,

    /// Print version.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: (),

    /// Report the state of the latest job in TARGET (default: `.`).
    #[arg(short = 'p', long, conflicts_with_all = ["kill", "workflow", "foreground"])]
    pub progress: bool,

    /// Terminate this user's processes belonging to the tool.
    #[arg(short = 'k', long, conflicts_with_all = ["workflow", "foreground"])]
    pub kill: bool,

    /// Print the tool's profile and exit.
    #[arg(short = 'w', long, conflicts_with = "foreground")]
    pub workflow: bool,

    /// Do not echo to the screen. Logs and fatal errors are unaffected.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Run the job in this process instead of detaching it.
    #[arg(short = 'f', long)]
    pub foreground: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `Holdon.toml` in the current working directory, if present.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOLDON_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Worker mode, used when the launcher re-executes itself.
    #[arg(long, hide = true, requires = "log", conflicts_with_all = ["progress", "kill", "workflow"])]
    pub detached: bool,

    /// Log file of a detached worker.
    #[arg(long, hide = true, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Item handed to a detached worker (repeatable).
    #[arg(long = "item", hide = true, value_name = "ITEM")]
    pub items: Vec<String>,

    /// Directory the job works in.
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Command to run instead of the profile's default.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// A parse that ended the program: help, version, or a usage error.
#[derive(Debug)]
pub struct ParseExit {
    pub code: i32,
    error: clap::Error,
}

impl ParseExit {
    /// Print the message (help and version to stdout, errors to stderr).
    pub fn print(&self) -> std::io::Result<()> {
        self.error.print()
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl From<clap::Error> for ParseExit {
    fn from(error: clap::Error) -> Self {
        let code = usage_error(&error).map_or(0, |e| e.exit_code());
        Self { code, error }
    }
}

fn context_str(error: &clap::Error, kind: ContextKind) -> Option<&str> {
    match error.get(kind) {
        Some(ContextValue::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Classify a clap error into the taxonomy. `None` for help and version.
fn usage_error(error: &clap::Error) -> Option<HoldonError> {
    let msg = || error.kind().to_string();
    let arg = context_str(error, ContextKind::InvalidArg).unwrap_or_default().to_string();

    Some(match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => return None,
        ErrorKind::UnknownArgument if arg.starts_with('-') => HoldonError::UnknownOption(arg),
        ErrorKind::UnknownArgument => HoldonError::UnexpectedArgument(arg),
        ErrorKind::MissingRequiredArgument => HoldonError::MissingValue(msg()),
        ErrorKind::InvalidValue
            if context_str(error, ContextKind::InvalidValue).is_some_and(str::is_empty) =>
        {
            HoldonError::MissingValue(arg)
        }
        ErrorKind::InvalidValue | ErrorKind::ValueValidation | ErrorKind::InvalidUtf8 => {
            HoldonError::InvalidValue(arg)
        }
        ErrorKind::ArgumentConflict => HoldonError::ConflictingOptions(arg),
        ErrorKind::TooManyValues | ErrorKind::WrongNumberOfValues => {
            HoldonError::UnexpectedArgument(arg)
        }
        _ => HoldonError::Other(anyhow::anyhow!("{}", msg())),
    })
}

/// Parse the process arguments.
pub fn parse() -> Result<CliArgs, ParseExit> {
    parse_from(std::env::args_os())
}

/// Parse an explicit argument list (first element is the program name).
pub fn parse_from<I, T>(args: I) -> Result<CliArgs, ParseExit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(args).map_err(ParseExit::from)
}
