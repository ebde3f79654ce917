use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::{error, info};
use std::path::{Path, PathBuf};

use netassign::config_loader::{self, RunConfig, Settings, SettingsOverrides, DEFAULT_SETTINGS_PATH};
use netassign::ip::probe_for;
use netassign::network::configurator_for;
use netassign::orchestrator::{Orchestrator, Outcome};
use netassign::platform::Platform;
use netassign::process::SystemRunner;
use netassign::provider::HttpConfigProvider;

/// Assign a static IP address from the store's per-role range
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store identifier appended to the configuration URL (defaults to $STORE)
    #[arg(short, long)]
    store: Option<String>,

    /// Node type: server, pos, kds or failover (defaults to $TYPENODE)
    #[arg(short, long)]
    role: Option<String>,

    /// Configuration service base URL, overriding the settings file
    #[arg(long)]
    api_url: Option<String>,

    /// Configuration service API key (defaults to $NETASSIGN_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Allocate an address and print the configuration without applying it
    #[arg(long)]
    dry_run: bool,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => config_loader::load_settings(path)?,
        None if Path::new(DEFAULT_SETTINGS_PATH).exists() => {
            config_loader::load_settings(Path::new(DEFAULT_SETTINGS_PATH))?
        }
        None => Settings::default(),
    };

    let overrides = SettingsOverrides {
        api_url: args.api_url.clone(),
        api_key: args.api_key.clone().or_else(|| env_value("NETASSIGN_API_KEY")),
    };
    config_loader::apply_overrides(&mut settings, &overrides)?;

    Ok(settings)
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = load_settings(&args)?;
    let store = args.store.clone().or_else(|| env_value("STORE"));
    let role = args.role.clone().or_else(|| env_value("TYPENODE"));

    let platform = Platform::current();
    info!("Starting netassign on {}", platform);

    let result = RunConfig::new(store, role, settings).and_then(|run| {
        let provider = HttpConfigProvider::new(&run.settings.api);
        let probe = probe_for(&platform, run.settings.probe.timeout, SystemRunner);
        let configurator = configurator_for(&platform, &run.settings, SystemRunner);

        let orchestrator = Orchestrator::new(&run, &provider, probe.as_ref(), configurator.as_ref())
            .dry_run(args.dry_run);
        orchestrator.run()
    });

    match result {
        Ok(Outcome::DhcpManaged) => info!("Nothing to do: network is DHCP-managed"),
        Ok(Outcome::Configured(address)) => info!("Host configured with {}", address),
        Ok(Outcome::Previewed { address, plan }) => {
            info!("Dry run: {} would be applied with", address);
            print!("{}", plan);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
