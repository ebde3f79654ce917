//! # Netassign - static IP assignment for store hosts
//!
//! This library assigns a static IPv4 address to a host at provisioning
//! time. The address is drawn from a per-role range published by a central
//! configuration service and applied to the host's network stack together
//! with its gateway and DNS servers.
//!
//! ## Overview
//!
//! A run fetches the store's network document, returns early when the
//! store network is DHCP-managed, and otherwise scans the range reserved
//! for the host's role (`server`, `pos`, `kds` or `failover`). Each
//! candidate gets a single echo probe; the lowest one that does not answer
//! is selected. The chosen address is then persisted with netplan on Linux
//! or with PowerShell networking cmdlets on Windows.
//!
//! ## Architecture
//!
//! - `config`: network document model (`NetworkInfo`, `Range`, `Role`)
//! - `config_loader`: tool settings file and the per-run `RunConfig`
//! - `provider`: configuration service client
//! - `ip`: subnet prefix, liveness probe and address allocator
//! - `network`: platform configurators and the configuration state machine
//! - `process`: external command execution boundary
//! - `platform`: host platform detection
//! - `orchestrator`: one assignment run from fetch to apply
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use netassign::config_loader::{RunConfig, Settings};
//! use netassign::ip::probe_for;
//! use netassign::network::configurator_for;
//! use netassign::orchestrator::Orchestrator;
//! use netassign::platform::Platform;
//! use netassign::process::SystemRunner;
//! use netassign::provider::HttpConfigProvider;
//!
//! let mut settings = Settings::default();
//! settings.api.base_url = "https://config.example.com/stores/".to_string();
//! settings.api.api_key = "token".to_string();
//!
//! let run = RunConfig::new(Some("0042".to_string()), Some("pos".to_string()), settings)?;
//! let platform = Platform::current();
//! let provider = HttpConfigProvider::new(&run.settings.api);
//! let probe = probe_for(&platform, run.settings.probe.timeout, SystemRunner);
//! let configurator = configurator_for(&platform, &run.settings, SystemRunner);
//!
//! let outcome = Orchestrator::new(&run, &provider, probe.as_ref(), configurator.as_ref()).run()?;
//! println!("{:?}", outcome);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Settings Format
//!
//! ```yaml
//! api:
//!   base_url: "https://config.example.com/stores/"
//!   api_key: "token"
//!   timeout: "10s"
//! probe:
//!   timeout: "1s"
//! linux:
//!   interface: "eth0"
//!   netplan_path: "/etc/netplan/99-custom.yaml"
//! windows:
//!   interface_alias: "Ethernet"
//! ```
//!
//! ## Error Handling
//!
//! Run failures are reported as [`error::AssignError`]; each variant maps to
//! its own process exit status. Settings problems are reported through
//! `color_eyre`.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod ip;
pub mod network;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod provider;
