// src/exec/command.rs

//! Shell-command implementations of the compile and publish steps.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Result, StylewatchError};
use crate::exec::pipeline::{BoxFuture, Compiler, Publisher};

/// How many trailing stderr lines are kept for error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Exit status and trailing stderr of a finished shell command.
#[derive(Debug, Clone)]
pub struct ShellOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr_tail: Vec<String>,
}

impl ShellOutput {
    /// One-line summary suitable for a log message or error.
    pub fn describe(&self, cmd: &str) -> String {
        let status = match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        if self.stderr_tail.is_empty() {
            format!("`{cmd}` failed with {status}")
        } else {
            format!("`{cmd}` failed with {status}: {}", self.stderr_tail.join("\n"))
        }
    }
}

/// Run `cmd` through the platform shell in `cwd`, streaming its stdout to
/// the log and keeping the tail of stderr.
///
/// Only a failure to start or wait on the process is an `Err`; a non-zero
/// exit is reported through `ShellOutput::success`.
pub async fn run_shell(label: &str, cmd: &str, cwd: Option<&PathBuf>) -> Result<ShellOutput> {
    info!(step = label, cmd = %cmd, "starting command");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning {label} command `{cmd}`"))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_task = stdout.map(|stdout| {
        let label = label.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(step = %label, "{}", line);
            }
        })
    });

    let stderr_task = stderr.map(|stderr| {
        let label = label.to_string();
        tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(step = %label, "stderr: {}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            tail.into_iter().collect::<Vec<_>>()
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for {label} command `{cmd}`"))?;

    if let Some(task) = stdout_task {
        let _ = task.await;
    }
    let stderr_tail = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => Vec::new(),
    };

    debug!(
        step = label,
        exit_code = ?status.code(),
        success = status.success(),
        "command exited"
    );

    Ok(ShellOutput {
        success: status.success(),
        code: status.code(),
        stderr_tail,
    })
}

/// Compile step backed by a shell command. A non-zero exit is a
/// `CompileError`; failing to start the command at all is not.
#[derive(Debug, Clone)]
pub struct ShellCompiler {
    cmd: String,
    cwd: Option<PathBuf>,
}

impl ShellCompiler {
    pub fn new(cmd: impl Into<String>, cwd: Option<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd,
        }
    }
}

impl Compiler for ShellCompiler {
    fn compile(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let output = run_shell("compile", &self.cmd, self.cwd.as_ref()).await?;
            if output.success {
                Ok(())
            } else {
                Err(StylewatchError::CompileError(output.describe(&self.cmd)))
            }
        })
    }
}

/// Publish step backed by a shell command. Any failure is a `PublishError`.
#[derive(Debug, Clone)]
pub struct ShellPublisher {
    cmd: String,
    cwd: Option<PathBuf>,
}

impl ShellPublisher {
    pub fn new(cmd: impl Into<String>, cwd: Option<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd,
        }
    }
}

impl Publisher for ShellPublisher {
    fn publish(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let output = run_shell("publish", &self.cmd, self.cwd.as_ref())
                .await
                .map_err(|err| StylewatchError::PublishError(err.to_string()))?;
            if output.success {
                Ok(())
            } else {
                Err(StylewatchError::PublishError(output.describe(&self.cmd)))
            }
        })
    }
}
