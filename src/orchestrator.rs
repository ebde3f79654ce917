//! Assignment orchestrator.
//!
//! This module coordinates one run: fetch the store's network document,
//! stop if the network is DHCP-managed, otherwise allocate an address from
//! the role's range and apply it through the platform configurator.

use crate::config::Role;
use crate::config_loader::RunConfig;
use crate::error::AssignError;
use crate::ip::{AddressAllocator, LivenessProbe};
use crate::network::{ConfigurationRun, NetworkConfigurator, StaticConfig};
use crate::provider::ConfigProvider;
use log::info;
use std::net::Ipv4Addr;

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The store network is DHCP-managed; nothing was probed or written
    DhcpManaged,
    /// The address was applied to the host
    Configured(Ipv4Addr),
    /// Dry run: the address was allocated and `plan` describes what would
    /// have been applied
    Previewed { address: Ipv4Addr, plan: String },
}

/// Wires the provider, probe and configurator together for one run
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    provider: &'a dyn ConfigProvider,
    probe: &'a dyn LivenessProbe,
    configurator: &'a dyn NetworkConfigurator,
    dry_run: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a RunConfig,
        provider: &'a dyn ConfigProvider,
        probe: &'a dyn LivenessProbe,
        configurator: &'a dyn NetworkConfigurator,
    ) -> Self {
        Orchestrator { config, provider, probe, configurator, dry_run: false }
    }

    /// Allocate but only preview the configuration
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn role(&self) -> Result<Role, AssignError> {
        self.config
            .role
            .as_deref()
            .ok_or_else(|| AssignError::UnknownRole("<unset> (TYPENODE)".to_string()))?
            .parse()
    }

    pub fn run(&self) -> Result<Outcome, AssignError> {
        let info = self.provider.fetch(&self.config.store)?;

        // DHCP is authoritative; static configuration must not compete with it
        if info.dhcp {
            info!("DHCP configured for store {}, leaving network configuration untouched", self.config.store);
            return Ok(Outcome::DhcpManaged);
        }

        let role = self.role()?;
        let range = info.range_for(role);
        let prefix = info.subnet.prefix()?;
        info!("Node type {} uses range {}{}..={}", role, prefix, range.from, range.to);

        let address = AddressAllocator::new(self.probe).allocate(range, prefix)?;

        let static_config = StaticConfig {
            address,
            mask: info.subnet.mask,
            nameservers: info.nameservers.clone(),
            gateway: info.gateway.clone(),
        };

        info!("Configuring static IP");
        info!("Address: {}", static_config.cidr());
        info!("Gateway: {}", static_config.gateway);
        info!("Name servers: {:?}", static_config.nameservers);

        if self.dry_run {
            let plan = self.configurator.preview(&static_config)?;
            return Ok(Outcome::Previewed { address, plan });
        }

        let mut run = ConfigurationRun::new();
        let address = run.run(self.configurator, &static_config).into_result()?;
        Ok(Outcome::Configured(address))
    }
}
