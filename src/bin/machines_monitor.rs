//! machines-monitor - terminal dashboard for a fleet of GPU/XPU hosts.
//!
//! Run: `machines-monitor --yaml-file configs/machines.yaml`

use anyhow::{Context, Result};
use clap::Parser;
use machines_monitor::{logging, poller, Config, Dashboard};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::info;

/// Terminal dashboard for a fleet of GPU/XPU hosts
#[derive(Parser, Debug)]
#[command(name = "machines-monitor")]
#[command(author = "PAIML Team")]
#[command(version)]
#[command(about = "Live CPU, memory, GPU/XPU and process view of remote hosts over ssh")]
#[command(long_about = None)]
struct Cli {
    /// Machine list in YAML
    #[arg(long, default_value = "configs/machines.yaml")]
    yaml_file: PathBuf,

    /// Refresh interval in seconds, overriding the config file
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Write logs to this file, overriding the config file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> machines_monitor::Result<Config> {
    let mut config = Config::load(&cli.yaml_file)?;
    if let Some(refresh) = cli.refresh {
        config.refresh_interval = refresh;
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = config.log_file.as_deref().map(logging::init).transpose()?;
    info!(
        config = %cli.yaml_file.display(),
        hosts = config.machines.len(),
        refresh_secs = config.refresh_interval,
        "starting"
    );

    let (tx, rx) = mpsc::channel();
    // Pollers are detached; they end with the process.
    poller::spawn_all(&config, &tx).context("failed to start pollers")?;
    drop(tx);

    let hosts = config.machines.iter().map(|m| m.host.clone());
    Dashboard::new(hosts, rx, config.refresh_interval()).run()?;

    info!("stopped");
    Ok(())
}
