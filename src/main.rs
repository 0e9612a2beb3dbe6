//! netwatch - network reachability monitor with automatic VPN control
//!
//! Continuously pings the configured endpoints, reports reachability
//! transitions, and keeps VPN links in their desired state.

use std::path::PathBuf;

use clap::Parser;
use netwatch_core::config::{toml_config, MonitorConfig};
use netwatch_core::error::{NetwatchError, Result};
use netwatch_core::init_logging;

mod app;
mod console;

#[derive(Parser)]
#[command(name = "netwatch")]
#[command(about = "Monitors endpoint reachability and keeps VPN links in their desired state")]
#[command(version)]
struct Cli {
    /// Time between checks in seconds
    #[arg(short = 't', long = "time", value_name = "SECS")]
    time: Option<f64>,

    /// Enable diagnostic logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file (default: ~/.config/netwatch/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<MonitorConfig> {
    let mut config = match &cli.config {
        Some(path) => toml_config::load_config_from_path(path)?,
        None => toml_config::load_config()?,
    };

    if let Some(time) = cli.time {
        config.settings.check_interval_secs = time;
    }
    if cli.verbose {
        config.settings.verbose = true;
    }
    config.validate().map_err(NetwatchError::Config)?;

    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = init_logging(config.settings.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    if let Err(e) = app::run(config).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
