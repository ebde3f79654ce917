//! External process execution.
//!
//! This module wraps the system commands used by the liveness probe and the
//! platform configurators (`ping`, `netplan`, `powershell`).

pub mod runner;
pub mod shell;

pub use runner::{CommandRunner, SystemRunner};
pub use shell::{CommandOutput, ShellCommand, ShellCommandError};
