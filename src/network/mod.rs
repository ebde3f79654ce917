//! Network configuration application.
//!
//! A [`NetworkConfigurator`] turns an allocated address into persisted host
//! configuration. One implementation exists per supported platform and is
//! picked once at startup by [`configurator_for`]. [`ConfigurationRun`]
//! drives a configurator through a single apply attempt.

pub mod netplan;
pub mod windows;

use crate::config_loader::Settings;
use crate::error::AssignError;
use crate::platform::Platform;
use crate::process::CommandRunner;
use std::net::Ipv4Addr;

pub use netplan::NetplanConfigurator;
pub use windows::PowerShellConfigurator;

/// Static addressing to apply to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticConfig {
    pub address: Ipv4Addr,
    pub mask: u8,
    pub nameservers: Vec<String>,
    pub gateway: String,
}

impl StaticConfig {
    /// Address in CIDR notation, e.g. `192.168.1.12/24`
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.mask)
    }
}

/// Persists and activates a [`StaticConfig`] on one platform
pub trait NetworkConfigurator {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Human-readable description of what [`apply`](Self::apply) would do
    fn preview(&self, config: &StaticConfig) -> Result<String, AssignError>;

    /// Write and activate the configuration
    fn apply(&self, config: &StaticConfig) -> Result<(), AssignError>;
}

/// Configurator for hosts with no supported configuration mechanism
#[derive(Debug, Clone)]
pub struct UnsupportedConfigurator {
    platform: Platform,
}

impl UnsupportedConfigurator {
    pub fn new(platform: Platform) -> Self {
        UnsupportedConfigurator { platform }
    }

    fn error(&self) -> AssignError {
        AssignError::UnsupportedPlatform(self.platform.to_string())
    }
}

impl NetworkConfigurator for UnsupportedConfigurator {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn preview(&self, _config: &StaticConfig) -> Result<String, AssignError> {
        Err(self.error())
    }

    fn apply(&self, _config: &StaticConfig) -> Result<(), AssignError> {
        Err(self.error())
    }
}

/// Pick the configurator for `platform`
pub fn configurator_for<R>(platform: &Platform, settings: &Settings, runner: R) -> Box<dyn NetworkConfigurator>
where
    R: CommandRunner + 'static,
{
    match platform {
        Platform::Linux => Box::new(NetplanConfigurator::new(&settings.linux, runner)),
        Platform::Windows => Box::new(PowerShellConfigurator::new(&settings.windows, runner)),
        other => Box::new(UnsupportedConfigurator::new(other.clone())),
    }
}

/// Terminal outcome of a configuration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationResult {
    Configured(Ipv4Addr),
    Failed(AssignError),
}

impl ConfigurationResult {
    pub fn into_result(self) -> Result<Ipv4Addr, AssignError> {
        match self {
            ConfigurationResult::Configured(address) => Ok(address),
            ConfigurationResult::Failed(err) => Err(err),
        }
    }
}

/// Progress of a [`ConfigurationRun`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfiguratorState {
    Unconfigured,
    Configuring,
    Configured(Ipv4Addr),
    Failed(AssignError),
}

impl ConfiguratorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConfiguratorState::Configured(_) | ConfiguratorState::Failed(_))
    }
}

/// One configuration attempt.
///
/// Moves from `Unconfigured` through `Configuring` to `Configured` or
/// `Failed`; once terminal, further calls return the stored result.
#[derive(Debug)]
pub struct ConfigurationRun {
    state: ConfiguratorState,
}

impl Default for ConfigurationRun {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationRun {
    pub fn new() -> Self {
        ConfigurationRun { state: ConfiguratorState::Unconfigured }
    }

    pub fn state(&self) -> &ConfiguratorState {
        &self.state
    }

    pub fn run(&mut self, configurator: &dyn NetworkConfigurator, config: &StaticConfig) -> ConfigurationResult {
        match &self.state {
            ConfiguratorState::Configured(address) => return ConfigurationResult::Configured(*address),
            ConfiguratorState::Failed(err) => return ConfigurationResult::Failed(err.clone()),
            ConfiguratorState::Unconfigured | ConfiguratorState::Configuring => {}
        }

        self.state = ConfiguratorState::Configuring;
        log::info!("Applying {} with {}", config.cidr(), configurator.name());

        let result = match configurator.apply(config) {
            Ok(()) => ConfigurationResult::Configured(config.address),
            Err(err) => ConfigurationResult::Failed(err),
        };

        self.state = match &result {
            ConfigurationResult::Configured(address) => ConfiguratorState::Configured(*address),
            ConfigurationResult::Failed(err) => ConfiguratorState::Failed(err.clone()),
        };
        result
    }
}
