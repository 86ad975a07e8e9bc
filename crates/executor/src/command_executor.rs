//! Confirmed-command execution with captured output.
//!
//! Commands run directly (argv split, no `sh -c`), bounded by a timeout.
//! Every failure mode - spawn error, timeout, nonzero exit - is folded
//! into the returned `ExecutionResult`; this layer never raises for a
//! command that merely failed.

use async_trait::async_trait;
use kaia_core::{ExecutionResult, Executor};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

pub struct CommandExecutor {
    timeout: Duration,
    working_dir: Mutex<PathBuf>,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self {
            timeout,
            working_dir: Mutex::new(cwd),
        }
    }

    pub fn working_dir(&self) -> PathBuf {
        self.working_dir.lock().clone()
    }

    /// Expand `~`, `$HOME` and `$USER` the way the interactive shell the
    /// user expects would.
    fn expand(command: &str) -> String {
        let home = std::env::var("HOME").unwrap_or_default();
        let user = std::env::var("USER").unwrap_or_default();
        command
            .replace("$HOME", &home)
            .replace('~', &home)
            .replace("$USER", &user)
    }

    fn failure(stderr: impl Into<String>) -> ExecutionResult {
        ExecutionResult {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: None,
        }
    }

    /// `cd` cannot usefully run in a subordinate process; it mutates the
    /// executor's tracked working directory instead.
    fn change_dir(&self, target: &str) -> ExecutionResult {
        let target = Self::expand(target);
        let mut cwd = self.working_dir.lock();
        let resolved = if Path::new(&target).is_absolute() {
            PathBuf::from(&target)
        } else {
            cwd.join(&target)
        };

        match resolved.canonicalize() {
            Ok(path) if path.is_dir() => {
                *cwd = path.clone();
                ExecutionResult {
                    stdout: format!("Changed directory to: {}", path.display()),
                    stderr: String::new(),
                    exit_code: Some(0),
                }
            }
            _ => ExecutionResult {
                stdout: String::new(),
                stderr: format!("Directory not found: {}", target),
                exit_code: Some(1),
            },
        }
    }

    pub async fn run(&self, command: &str) -> ExecutionResult {
        let expanded = Self::expand(command);

        let argv = match shell_words::split(&expanded) {
            Ok(argv) => argv,
            Err(e) => return Self::failure(format!("Could not parse command: {}", e)),
        };

        let Some((program, args)) = argv.split_first() else {
            return Self::failure("Empty command");
        };

        if program.as_str() == "cd" {
            return self.change_dir(args.first().map(String::as_str).unwrap_or("~"));
        }

        let cwd = self.working_dir();
        info!(command = expanded.as_str(), cwd = %cwd.display(), "executing command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(command = expanded.as_str(), error = %e, "command failed to spawn");
                return Self::failure(e.to_string());
            }
            Err(_) => {
                warn!(command = expanded.as_str(), "command timed out");
                return Self::failure(format!(
                    "Command timed out after {} seconds.",
                    self.timeout.as_secs()
                ));
            }
        };

        ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            exit_code: output.status.code(),
        }
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        self.run(command).await
    }
}
