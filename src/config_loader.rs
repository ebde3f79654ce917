use crate::error::AssignError;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file read when `--config` is not given
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/netassign/config.yaml";

/// Configuration service endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    /// URL the store identifier is appended to
    pub base_url: String,
    /// Value sent in the `X-API-KEY` header
    pub api_key: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProbeSettings {
    /// How long to wait for an echo reply from each candidate
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(1) }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LinuxSettings {
    pub interface: String,
    pub netplan_path: PathBuf,
    pub renderer: String,
}

impl Default for LinuxSettings {
    fn default() -> Self {
        Self {
            interface: "eth0".to_string(),
            netplan_path: PathBuf::from("/etc/netplan/99-custom.yaml"),
            renderer: "networkd".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowsSettings {
    pub interface_alias: String,
}

impl Default for WindowsSettings {
    fn default() -> Self {
        Self { interface_alias: "Ethernet".to_string() }
    }
}

/// Tool settings, loaded from YAML
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub probe: ProbeSettings,
    pub linux: LinuxSettings,
    pub windows: WindowsSettings,
}

/// Settings validation errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("api.base_url is not set")]
    MissingBaseUrl,
    #[error("api.api_key is not set")]
    MissingApiKey,
    #[error("probe.timeout must be greater than zero")]
    ZeroProbeTimeout,
    #[error("linux.interface cannot be empty")]
    EmptyInterface,
    #[error("windows.interface_alias cannot be empty")]
    EmptyInterfaceAlias,
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        if self.api.base_url.trim().is_empty() {
            return Err(SettingsError::MissingBaseUrl);
        }
        if self.api.api_key.is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if self.probe.timeout.is_zero() {
            return Err(SettingsError::ZeroProbeTimeout);
        }
        if self.linux.interface.is_empty() {
            return Err(SettingsError::EmptyInterface);
        }
        if self.windows.interface_alias.is_empty() {
            return Err(SettingsError::EmptyInterfaceAlias);
        }
        Ok(())
    }
}

/// Load and parse settings from a YAML file.
///
/// The result is not validated yet; call [`apply_overrides`] afterwards.
pub fn load_settings(path: &Path) -> Result<Settings> {
    info!("Loading settings from: {:?}", path);

    let file = File::open(path).wrap_err_with(|| format!("Failed to open settings file '{}'", path.display()))?;
    let settings: Settings = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse settings file '{}'", path.display()))?;

    Ok(settings)
}

/// Command-line and environment values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

/// Apply overrides to the settings, then validate the result
pub fn apply_overrides(settings: &mut Settings, overrides: &SettingsOverrides) -> Result<()> {
    if let Some(url) = &overrides.api_url {
        settings.api.base_url = url.clone();
    }
    if let Some(key) = &overrides.api_key {
        settings.api.api_key = key.clone();
    }

    settings.validate().wrap_err("Invalid settings")?;
    Ok(())
}

/// Everything a run needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Store identifier appended to the fetch URL
    pub store: String,
    /// Node type selector as given; checked after the fetch
    pub role: Option<String>,
    pub settings: Settings,
}

impl RunConfig {
    pub fn new(store: Option<String>, role: Option<String>, settings: Settings) -> std::result::Result<Self, AssignError> {
        let store = store
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AssignError::ConfigFetch("store identifier is not set (STORE)".to_string()))?;

        Ok(RunConfig { store, role, settings })
    }
}
