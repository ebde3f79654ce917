//! Windows configuration through PowerShell networking cmdlets.

use super::{NetworkConfigurator, StaticConfig};
use crate::config_loader::WindowsSettings;
use crate::error::AssignError;
use crate::process::CommandRunner;

/// Sets address and DNS servers on a named interface with two cmdlet calls
pub struct PowerShellConfigurator<R> {
    interface_alias: String,
    runner: R,
}

impl<R: CommandRunner> PowerShellConfigurator<R> {
    pub fn new(settings: &WindowsSettings, runner: R) -> Self {
        PowerShellConfigurator {
            interface_alias: settings.interface_alias.clone(),
            runner,
        }
    }

    fn quoted_alias(&self) -> String {
        format!("'{}'", self.interface_alias.replace('\'', "''"))
    }

    /// `New-NetIPAddress` invocation for the address, prefix and gateway
    pub fn address_command(&self, config: &StaticConfig) -> String {
        format!(
            "New-NetIPAddress -InterfaceAlias {} -IPAddress {} -PrefixLength {} -DefaultGateway {}",
            self.quoted_alias(),
            config.address,
            config.mask,
            config.gateway
        )
    }

    /// `Set-DnsClientServerAddress` invocation for the nameserver list
    pub fn dns_command(&self, config: &StaticConfig) -> String {
        format!(
            "Set-DnsClientServerAddress -InterfaceAlias {} -ServerAddresses {}",
            self.quoted_alias(),
            config.nameservers.join(",")
        )
    }

    fn powershell(&self, step: &str, script: String) -> Result<(), AssignError> {
        let args = vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
            script,
        ];

        self.runner
            .run("powershell", &args)
            .and_then(|output| output.into_result())
            .map(|_| ())
            .map_err(|e| AssignError::ConfigurationApply(format!("{} on {}: {}", step, self.interface_alias, e)))
    }
}

impl<R: CommandRunner> NetworkConfigurator for PowerShellConfigurator<R> {
    fn name(&self) -> &'static str {
        "powershell"
    }

    fn preview(&self, config: &StaticConfig) -> Result<String, AssignError> {
        Ok(format!("{}\n{}\n", self.address_command(config), self.dns_command(config)))
    }

    fn apply(&self, config: &StaticConfig) -> Result<(), AssignError> {
        self.powershell("setting static address", self.address_command(config))?;
        self.powershell("setting DNS servers", self.dns_command(config))?;

        log::info!("Static IP configured successfully on Windows using PowerShell");
        Ok(())
    }
}
