//! Startup wiring and task supervision
//!
//! Builds monitors from the validated configuration in two phases:
//! construct all entities first, then resolve name/address references
//! into direct state handles. Only after wiring are the tasks spawned,
//! so no runtime lookups or registries are needed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use netwatch_core::config::{MonitorConfig, TargetConfig, INTERNET_MONITOR_NAME};
use netwatch_core::monitor::{EventSink, HostMonitor, StatusBoard};
use netwatch_core::types::{EntityId, SharedLinkState};
use netwatch_core::vpn::{VpnController, VpnTiming};

use crate::console::ConsoleSink;

/// Build, wire and run all monitor tasks until SIGINT
pub async fn run(config: MonitorConfig) -> anyhow::Result<()> {
    let board = Arc::new(StatusBoard::new());
    let sink: Arc<dyn EventSink> = Arc::new(ConsoleSink::new(board.clone()));

    // Phase 1: construct hosts, collect VPN declarations
    let mut hosts: Vec<HostMonitor> = Vec::new();
    let mut host_by_address: HashMap<String, SharedLinkState> = HashMap::new();
    let mut internet: Option<SharedLinkState> = None;
    let mut vpns = Vec::new();

    for (group, group_config) in config.groups.iter().enumerate() {
        for target in &group_config.targets {
            match target {
                TargetConfig::Host(host) => {
                    let monitor = HostMonitor::new(
                        Some(EntityId::new(group, host.name.as_str())),
                        host.address.as_str(),
                    );
                    host_by_address.insert(host.address.clone(), monitor.state());
                    hosts.push(monitor);
                }
                TargetConfig::InternetMonitor(target) => {
                    let monitor = HostMonitor::new(
                        Some(EntityId::new(group, INTERNET_MONITOR_NAME)),
                        target.address.as_str(),
                    );
                    internet = Some(monitor.state());
                    host_by_address.insert(target.address.clone(), monitor.state());
                    hosts.push(monitor);
                }
                TargetConfig::Vpn(vpn) => {
                    vpns.push((EntityId::new(group, vpn.name.as_str()), vpn.clone()));
                }
            }
        }
    }

    // Phase 2: resolve VPN references; unmatched ping targets get a
    // private id-less monitor that never reaches the sink
    let timing = VpnTiming::with_check_interval(Duration::from_secs_f64(
        config.settings.check_interval_secs,
    ));
    let mut controllers = Vec::new();

    for (id, target) in vpns {
        let tunnel_monitor = target.ping_ip.as_ref().map(|address| {
            if let Some(state) = host_by_address.get(address) {
                debug!(vpn = %id, %address, "tunnel liveness shares an existing host monitor");
                state.clone()
            } else {
                debug!(vpn = %id, %address, "tunnel liveness uses a private probe");
                let monitor = HostMonitor::new(None, address.as_str());
                let state = monitor.state();
                hosts.push(monitor);
                state
            }
        });

        controllers.push(VpnController::new(
            id,
            &target,
            timing.clone(),
            internet.clone(),
            tunnel_monitor,
            sink.clone(),
        ));
    }

    // Phase 3: spawn one task per monitor and per controller
    let host_count = hosts.len();
    let vpn_count = controllers.len();
    for host in hosts {
        tokio::spawn(host.run(sink.clone()));
    }
    for controller in controllers {
        tokio::spawn(controller.run());
    }

    info!(hosts = host_count, vpns = vpn_count, "netwatch running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    for (id, state) in board.snapshot() {
        info!(entity = %id, state = %state, "final state");
    }
    info!("shutting down");
    Ok(())
}
