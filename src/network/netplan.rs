//! Linux configuration through netplan.
//!
//! The static definition is rendered to a single netplan file that replaces
//! whatever was there before, then activated with `netplan apply`. Rendering
//! is deterministic, so identical input produces an identical file.

use super::{NetworkConfigurator, StaticConfig};
use crate::config_loader::LinuxSettings;
use crate::error::AssignError;
use crate::process::CommandRunner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top level of a netplan YAML file
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NetplanDocument {
    pub network: NetplanNetwork,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NetplanNetwork {
    pub version: u8,
    pub renderer: String,
    pub ethernets: BTreeMap<String, NetplanEthernet>,
}

/// Static addressing for one ethernet interface
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NetplanEthernet {
    pub dhcp4: bool,
    pub addresses: Vec<String>,
    pub gateway4: String,
    pub nameservers: NetplanNameservers,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NetplanNameservers {
    pub addresses: Vec<String>,
}

impl NetplanDocument {
    /// Single-interface static definition for `config`
    pub fn for_interface(interface: &str, renderer: &str, config: &StaticConfig) -> Self {
        let ethernet = NetplanEthernet {
            dhcp4: false,
            addresses: vec![config.cidr()],
            gateway4: config.gateway.clone(),
            nameservers: NetplanNameservers { addresses: config.nameservers.clone() },
        };

        let mut ethernets = BTreeMap::new();
        ethernets.insert(interface.to_string(), ethernet);

        NetplanDocument {
            network: NetplanNetwork { version: 2, renderer: renderer.to_string(), ethernets },
        }
    }
}

/// Writes a netplan file and runs `netplan apply`
pub struct NetplanConfigurator<R> {
    interface: String,
    renderer: String,
    path: PathBuf,
    runner: R,
}

impl<R: CommandRunner> NetplanConfigurator<R> {
    pub fn new(settings: &LinuxSettings, runner: R) -> Self {
        NetplanConfigurator {
            interface: settings.interface.clone(),
            renderer: settings.renderer.clone(),
            path: settings.netplan_path.clone(),
            runner,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Netplan YAML for `config`
    pub fn render(&self, config: &StaticConfig) -> Result<String, AssignError> {
        let document = NetplanDocument::for_interface(&self.interface, &self.renderer, config);
        serde_yaml::to_string(&document)
            .map_err(|e| AssignError::ConfigurationApply(format!("rendering netplan document: {}", e)))
    }

    fn write(&self, contents: &str) -> Result<(), AssignError> {
        let io_error = |e: std::io::Error| {
            AssignError::ConfigurationApply(format!("writing {}: {}", self.path.display(), e))
        };

        fs::write(&self.path, contents).map_err(io_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o644)).map_err(io_error)?;
        }

        Ok(())
    }
}

impl<R: CommandRunner> NetworkConfigurator for NetplanConfigurator<R> {
    fn name(&self) -> &'static str {
        "netplan"
    }

    fn preview(&self, config: &StaticConfig) -> Result<String, AssignError> {
        Ok(format!("# {}\n{}", self.path.display(), self.render(config)?))
    }

    fn apply(&self, config: &StaticConfig) -> Result<(), AssignError> {
        let contents = self.render(config)?;
        log::debug!("Netplan configuration for {}:\n{}", self.path.display(), contents);
        self.write(&contents)?;

        self.runner
            .run("netplan", &["apply".to_string()])
            .and_then(|output| output.into_result())
            .map_err(|e| AssignError::ConfigurationApply(format!("netplan apply: {}", e)))?;

        log::info!("Static IP configured successfully on Linux using Netplan");
        Ok(())
    }
}
