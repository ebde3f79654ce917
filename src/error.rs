//! Error taxonomy for a single assignment run.
//!
//! Every variant is terminal: the orchestrator returns it up the call chain
//! and only the binary entry point turns it into a process exit status.

use thiserror::Error;

/// Errors that end an assignment run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// The configuration service could not be reached, or answered with an
    /// empty or malformed document
    #[error("failed to fetch network configuration: {0}")]
    ConfigFetch(String),

    /// The node type selector is missing or not one of the known roles
    #[error("unknown machine type: {0}")]
    UnknownRole(String),

    /// Every candidate in the role's range answered the liveness probe
    #[error("no available address in {prefix}{from}..={to}")]
    NoAvailableAddress { prefix: String, from: u8, to: u8 },

    /// The host operating system is not one of the supported platforms
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    /// Writing or activating the network configuration failed
    #[error("failed to apply network configuration: {0}")]
    ConfigurationApply(String),
}

impl AssignError {
    /// Process exit status reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AssignError::ConfigFetch(_) => 2,
            AssignError::UnknownRole(_) => 3,
            AssignError::NoAvailableAddress { .. } => 4,
            AssignError::UnsupportedPlatform(_) => 5,
            AssignError::ConfigurationApply(_) => 6,
        }
    }
}
