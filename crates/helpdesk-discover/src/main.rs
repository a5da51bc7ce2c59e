//! CLI entry point for the helpdesk network discovery engine.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use helpdesk_discover::config::Settings;
use helpdesk_discover::{DiscoveryService, ScanScheduler};
use helpdesk_inventory::InventoryClient;

#[derive(Parser)]
#[command(name = "helpdesk-discover")]
#[command(about = "Network asset discovery for the helpdesk equipment inventory")]
struct Cli {
    /// Sweep every configured subnet once and print the report.
    #[arg(long)]
    once: bool,

    /// Run the periodic scheduler until Ctrl-C.
    #[arg(long)]
    daemon: bool,

    /// Discover a single IPv4 address.
    #[arg(long, value_name = "IP")]
    host: Option<String>,

    /// Check whether an address answers SNMP.
    #[arg(long, value_name = "IP")]
    test_snmp: Option<String>,

    /// Print the discovery configuration status.
    #[arg(long)]
    status: bool,

    /// Config file prefix (default: helpdesk).
    #[arg(short, long, default_value = "helpdesk")]
    config: String,

    /// Inventory snapshot, loaded before and saved after the run.
    #[arg(long, value_name = "PATH")]
    inventory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;

    let inventory = match &cli.inventory {
        Some(path) => InventoryClient::load_snapshot(path)
            .with_context(|| format!("loading inventory from {}", path.display()))?,
        None => InventoryClient::new(),
    };
    tracing::info!(records = inventory.count().await, "Inventory loaded");

    if cli.status {
        let status = helpdesk_discover::DiscoveryStatus::from(&settings.discovery);
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let service = DiscoveryService::from_settings(&settings, Arc::new(inventory.clone())).await;

    if let Some(ip) = &cli.test_snmp {
        let reachable = service.test_connectivity(ip).await;
        println!("{}", serde_json::json!({ "ip": ip, "snmp": reachable }));
        return Ok(());
    }

    if let Some(ip) = &cli.host {
        let equipment = service.scan_one(ip).await??;
        println!("{}", serde_json::to_string_pretty(&equipment)?);
    } else if cli.once {
        let report = service.scan_all().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.daemon {
        let mut scheduler = ScanScheduler::with_interval(service);
        scheduler.start();
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");
        scheduler.stop().await;
    } else {
        anyhow::bail!("Specify --once, --daemon, --host <ip>, --test-snmp <ip> or --status");
    }

    if let Some(path) = &cli.inventory {
        inventory
            .save_snapshot(path)
            .await
            .with_context(|| format!("saving inventory to {}", path.display()))?;
        tracing::info!(path = %path.display(), records = inventory.count().await, "Inventory saved");
    }

    Ok(())
}
