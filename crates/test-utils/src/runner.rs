//! Driving the built `holdon` binary, for tests that need the real
//! self-re-exec of a detached worker.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::{Instant, sleep};

use crate::STEP_TIMEOUT;

const POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// The binary under test, run from a fixed working directory.
#[derive(Debug, Clone)]
pub struct HoldonBin {
    exe: PathBuf,
    cwd: PathBuf,
}

impl HoldonBin {
    /// `exe` is the calling test's `env!("CARGO_BIN_EXE_holdon")`.
    pub fn new(exe: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            cwd: cwd.into(),
        }
    }

    /// Run to completion. A detached worker it starts does not hold the pipes.
    pub async fn run(&self, args: &[&str]) -> RunOutput {
        let child = Command::new(&self.exe)
            .args(args)
            .current_dir(&self.cwd)
            .env_remove(holdon::logging::LOG_ENV)
            .stdin(Stdio::null())
            .output();

        let out = tokio::time::timeout(STEP_TIMEOUT, child)
            .await
            .unwrap_or_else(|_| panic!("holdon {args:?} did not return"))
            .expect("run holdon binary");

        RunOutput {
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        }
    }
}

/// Files in `dir` whose name starts with `prefix`, sorted by name.
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// Re-read `path` until `done` accepts its content or [`STEP_TIMEOUT`] runs
/// out. Returns the last content seen either way.
pub async fn wait_for_content(path: &Path, done: impl Fn(&str) -> bool) -> String {
    let deadline = Instant::now() + STEP_TIMEOUT;
    loop {
        let text = fs::read_to_string(path).unwrap_or_default();
        if done(&text) || Instant::now() >= deadline {
            return text;
        }
        sleep(POLL).await;
    }
}
