//! Shell command execution with captured output.

use std::ffi::OsStr;
use std::process::{Command, Output};

/// Errors that can occur when running an external command
#[derive(Debug, thiserror::Error)]
pub enum ShellCommandError {
    /// The command could not be launched
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a non-zero status
    #[error("{program} failed with exit code {code:?}; stdout: {stdout}; stderr: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub program: String,
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A zero-exit output, mostly useful for fake runners
    pub fn succeeded(program: &str, stdout: &str) -> Self {
        CommandOutput {
            program: program.to_string(),
            success: true,
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// A non-zero-exit output, mostly useful for fake runners
    pub fn failed(program: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        CommandOutput {
            program: program.to_string(),
            success: false,
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    /// Standard output followed by standard error
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined
    }

    /// Turn a non-zero exit into an error, returning stdout otherwise
    pub fn into_result(self) -> Result<String, ShellCommandError> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(ShellCommandError::Failed {
                program: self.program,
                code: self.code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Thin wrapper around [`Command`] that captures and logs output
pub struct ShellCommand {
    program: String,
    cmd: Command,
}

impl ShellCommand {
    /// Returns a new shell command that will execute `program`
    pub fn new(program: &str) -> Self {
        ShellCommand {
            program: program.to_string(),
            cmd: Command::new(program),
        }
    }

    /// Adds several arguments to this shell command
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    fn capture(program: String, output: Output) -> CommandOutput {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stdout.is_empty() {
            log::debug!("{} stdout:\n{}", program, stdout);
        }

        if !stderr.is_empty() {
            log::debug!("{} stderr:\n{}", program, stderr);
        }

        CommandOutput {
            program,
            success: output.status.success(),
            code: output.status.code(),
            stdout,
            stderr,
        }
    }

    /// Runs the command to completion, capturing stdout/stderr whatever the
    /// exit status
    pub fn output(mut self) -> Result<CommandOutput, ShellCommandError> {
        log::debug!("command: {:?}", self.cmd);
        let output = self.cmd.output().map_err(|source| ShellCommandError::Launch {
            program: self.program.clone(),
            source,
        })?;
        Ok(Self::capture(self.program, output))
    }
}
