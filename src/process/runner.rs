//! Process execution boundary.
//!
//! Probing and configuration only reach the operating system through
//! [`CommandRunner`], so they can be driven by a fake in tests.

use super::shell::{CommandOutput, ShellCommand, ShellCommandError};

/// Runs an external program and captures its output
pub trait CommandRunner {
    /// Run `program` with `args` to completion.
    ///
    /// A non-zero exit is still `Ok`; only a failure to launch is an error.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ShellCommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ShellCommandError> {
        (**self).run(program, args)
    }
}

/// Runs commands on the host with [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ShellCommandError> {
        ShellCommand::new(program).args(args).output()
    }
}
