//! Shell command execution with captured output
//!
//! `CommandRunner` hands a literal command string to the platform shell and
//! always returns a `CommandResult`, even when the shell cannot be spawned.
//! No timeout is applied: a command that never exits blocks the caller.

use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};

use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::output::stdout_for;

/// The shell used to interpret command strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    /// `/bin/sh -c`
    Posix,
    /// `powershell.exe -NoProfile -Command`
    PowerShell,
}

impl Shell {
    /// The shell for the platform this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Shell::PowerShell
        } else {
            Shell::Posix
        }
    }

    fn command(self, script: &str) -> Command {
        let mut cmd = match self {
            Shell::Posix => {
                let mut c = Command::new("/bin/sh");
                c.arg("-c");
                c
            }
            Shell::PowerShell => {
                let mut c = Command::new("powershell.exe");
                c.args(["-NoProfile", "-NonInteractive", "-Command"]);
                c
            }
        };
        cmd.arg(script);
        cmd
    }
}

/// Why a command did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandFailure {
    #[error("failed to start shell: {message}")]
    Spawn { message: String },

    #[error("{message}")]
    NonZeroExit { code: Option<i32>, message: String },
}

/// Outcome of one command. Output captured before a failure is kept.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandResult {
    pub exited_normally: bool,
    pub stdout: String,
    pub stderr: String,
    pub failure: Option<CommandFailure>,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    fn spawn_failed(err: &io::Error) -> Self {
        Self {
            exited_normally: false,
            stdout: String::new(),
            stderr: String::new(),
            failure: Some(CommandFailure::Spawn {
                message: err.to_string(),
            }),
        }
    }
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("command exited with status {}", code),
        None => "command was terminated by a signal".to_string(),
    }
}

/// Runs one command at a time through a shell chosen once at construction.
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner {
    shell: Shell,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::with_shell(Shell::host())
    }

    pub fn with_shell(shell: Shell) -> Self {
        Self { shell }
    }

    /// Run `command` to completion and capture its output.
    pub async fn run(&self, command: &str) -> CommandResult {
        debug!(shell = ?self.shell, command, "running command");

        let output = self
            .shell
            .command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(o) => o,
            Err(e) => {
                warn!(error = %e, "failed to spawn shell");
                return CommandResult::spawn_failed(&e);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return CommandResult {
                exited_normally: true,
                stdout,
                stderr,
                failure: None,
            };
        }

        let message = describe_exit(output.status);
        warn!(command, %message, "command failed");
        CommandResult {
            exited_normally: false,
            stdout,
            stderr,
            failure: Some(CommandFailure::NonZeroExit {
                code: output.status.code(),
                message,
            }),
        }
    }
}

/// Print captured output of a command run, then its error if it failed.
pub fn print_command_result(result: &CommandResult, use_color: bool) -> io::Result<()> {
    let mut stdout = stdout_for(use_color);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red));

    if !result.stdout.is_empty() {
        write!(stdout, "{}", result.stdout)?;
        if !result.stdout.ends_with('\n') {
            writeln!(stdout)?;
        }
    }
    if !result.stderr.is_empty() {
        stdout.set_color(&red)?;
        write!(stdout, "{}", result.stderr)?;
        if !result.stderr.ends_with('\n') {
            writeln!(stdout)?;
        }
        stdout.reset()?;
    }
    if let Some(failure) = &result.failure {
        red.set_bold(true);
        stdout.set_color(&red)?;
        writeln!(stdout, "Error: {}", failure)?;
        stdout.reset()?;
    }
    Ok(())
}
