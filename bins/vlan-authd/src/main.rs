//! vlan-authd - dynamic VLAN topology daemon for a wireless AP
//! authenticator.
//!
//! Watches netlink for station interfaces appearing and disappearing and
//! wires them into per-VID bridges, either directly against the kernel or
//! through an external helper script, the way hostapd's full dynamic VLAN
//! support does.

mod bindings;
mod config;
mod driver;
mod error;
mod hooks;
mod ifname;
mod model;
mod registry;
mod topology;
mod watcher;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use config::VlanConfig;
use driver::kernel::KernelDriver;
use driver::script::ScriptDriver;
use driver::TopologyDriver;
use error::Result;
use hooks::{NullPreauthHook, NullWpaHook};
use topology::TopologyManager;
use watcher::Watcher;

#[derive(Parser)]
#[command(
    name = "vlan-authd",
    version,
    about = "Dynamic VLAN topology daemon for a wireless AP authenticator"
)]
struct Cli {
    /// Path to the VLAN configuration file (JSON).
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Helper script overriding the one named in the configuration file.
    #[arg(long)]
    script: Option<String>,

    /// Emit structured JSON logs instead of the default text format.
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()),
    );
    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let raw = std::fs::read_to_string(&cli.config)?;
    let mut config: VlanConfig = serde_json::from_str(&raw)?;
    if let Some(script) = cli.script {
        config.vlan_script = Some(script);
    }

    let driver: Box<dyn TopologyDriver> = match &config.vlan_script {
        Some(script) => Box::new(ScriptDriver::new(script.clone())),
        None => Box::new(KernelDriver::new()?),
    };

    let mut topology = TopologyManager::new(
        config,
        driver,
        Box::new(NullWpaHook),
        Box::new(NullPreauthHook),
    )?;
    topology.init().await?;
    info!("vlan-authd ready");

    let mut watcher = Watcher::new()?;
    let result = watcher.run(&mut topology).await;

    if let Err(e) = topology.deinit().await {
        error!("error tearing down VLAN topology: {e}");
    }
    result
}
