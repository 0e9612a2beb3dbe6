//! VPN link controller
//!
//! Every tick the controller samples internet health, the local address
//! set and tunnel liveness, decides whether the tunnel should be up, and
//! converges by launching the configured connect/disconnect command.
//! Repeated launches in the same direction are rate limited by a cooldown
//! so a slow script is not re-run while it is still settling.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{VpnMode, VpnTarget};
use crate::error::NetwatchError;
use crate::monitor::sink::EventSink;
use crate::types::{EntityId, LinkState, SharedLinkState};
use crate::vpn::{command, netinfo};

/// Timing knobs for the decision loop
#[derive(Debug, Clone)]
pub struct VpnTiming {
    /// Interval between ticks and between consecutive health reads
    pub check_interval: Duration,

    /// Minimum time between repeated command launches
    pub command_wait: Duration,

    /// Consecutive Up reads required from the internet monitor
    pub internet_checks: u32,

    /// Consecutive Up reads required from the tunnel liveness monitor
    pub vpn_pings: u32,
}

impl VpnTiming {
    /// Default timing with a custom tick interval
    pub fn with_check_interval(check_interval: Duration) -> Self {
        Self {
            check_interval,
            ..Self::default()
        }
    }
}

impl Default for VpnTiming {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(1),
            command_wait: Duration::from_secs(10),
            internet_checks: 3,
            vpn_pings: 5,
        }
    }
}

/// Tunnel lifecycle phase
///
/// Sinks never see the phase directly; it collapses to a [`LinkState`]
/// via [`VpnPhase::as_link_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpnPhase {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl VpnPhase {
    /// External state reported for this phase
    pub fn as_link_state(self) -> LinkState {
        match self {
            VpnPhase::Connected => LinkState::Up,
            VpnPhase::Disconnected => LinkState::Down,
            VpnPhase::Connecting | VpnPhase::Disconnecting => LinkState::Unknown,
        }
    }
}

/// Inputs sampled for one tick
#[derive(Debug, Clone, Copy)]
struct TickInputs {
    shall_vpn: bool,
    tunnel_up: bool,
    cooling_down: bool,
    internet_ok: bool,
}

/// Action selected for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickAction {
    SettleConnected,
    SettleDisconnected,
    LaunchConnect,
    LaunchDisconnect,
    Hold,
}

/// Pick the action for one tick; the first matching rule wins.
///
/// Rules 1 and 2 detect convergence and settle the visible state; rules
/// 3 and 4 launch a command, gated by the cooldown while a previous
/// launch in the same direction may still be settling. The internet
/// precondition applies to connect attempts only.
fn decide(phase: Option<VpnPhase>, inputs: TickInputs) -> TickAction {
    let TickInputs {
        shall_vpn,
        tunnel_up,
        cooling_down,
        internet_ok,
    } = inputs;

    if shall_vpn && tunnel_up && phase != Some(VpnPhase::Connected) {
        TickAction::SettleConnected
    } else if !shall_vpn && !tunnel_up && phase != Some(VpnPhase::Disconnected) {
        TickAction::SettleDisconnected
    } else if shall_vpn
        && !tunnel_up
        && (phase != Some(VpnPhase::Connecting) || !cooling_down)
        && internet_ok
    {
        TickAction::LaunchConnect
    } else if !shall_vpn && tunnel_up && (phase != Some(VpnPhase::Disconnecting) || !cooling_down) {
        TickAction::LaunchDisconnect
    } else {
        TickAction::Hold
    }
}

/// Controller reconciling one VPN link with its desired state
///
/// References to the internet monitor and the tunnel-liveness monitor are
/// resolved during wiring, before the controller task is spawned.
pub struct VpnController {
    id: EntityId,
    assigned_prefix: String,
    exclude_prefixes: Vec<String>,
    connect_cmd: String,
    disconnect_cmd: String,
    mode: VpnMode,
    timing: VpnTiming,
    phase: Option<VpnPhase>,
    state: SharedLinkState,
    internet: Option<SharedLinkState>,
    tunnel_monitor: Option<SharedLinkState>,
    last_command: Option<Instant>,
    sink: Arc<dyn EventSink>,
}

impl VpnController {
    /// Create a controller from a validated target declaration
    ///
    /// # Arguments
    /// * `internet` - state handle of the INTERNET monitor, if one is configured
    /// * `tunnel_monitor` - state handle of the tunnel-liveness monitor, if a
    ///   ping target is configured
    pub fn new(
        id: EntityId,
        target: &VpnTarget,
        timing: VpnTiming,
        internet: Option<SharedLinkState>,
        tunnel_monitor: Option<SharedLinkState>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            assigned_prefix: target.assigned_ip.clone(),
            exclude_prefixes: target.exclude_ips.clone(),
            connect_cmd: target.connect.clone(),
            disconnect_cmd: target.disconnect.clone(),
            mode: target.mode,
            timing,
            phase: None,
            state: SharedLinkState::new(),
            internet,
            tunnel_monitor,
            last_command: None,
            sink,
        }
    }

    /// Handle to the externally visible state
    pub fn state(&self) -> SharedLinkState {
        self.state.clone()
    }

    /// Current lifecycle phase, None until the first settle or launch
    pub fn phase(&self) -> Option<VpnPhase> {
        self.phase
    }

    /// Run the controller loop until process exit
    ///
    /// Errors in one tick are logged and swallowed; the controller must
    /// resume on the next tick rather than terminate.
    pub async fn run(mut self) {
        loop {
            sleep(self.timing.check_interval).await;
            if let Err(e) = self.tick().await {
                debug!(vpn = %self.id, error = %e, "tick failed, continuing");
            }
        }
    }

    /// Sample all inputs and evaluate one tick
    async fn tick(&mut self) -> Result<(), NetwatchError> {
        let internet_ok = self.internet_connected().await;
        let ips = netinfo::ip_addresses()?;
        self.tick_with(&ips, internet_ok).await;
        Ok(())
    }

    /// Evaluate one tick against a given address set
    ///
    /// Split out from [`tick`](Self::tick) so the decision path can be
    /// driven deterministically without touching real interfaces.
    pub async fn tick_with(&mut self, ips: &HashSet<String>, internet_ok: bool) {
        let tunnel_up = self.tunnel_up(ips).await;
        let cooling_down = self.cooling_down();
        let shall_vpn = self.shall_vpn(ips);

        let action = decide(
            self.phase,
            TickInputs {
                shall_vpn,
                tunnel_up,
                cooling_down,
                internet_ok,
            },
        );
        self.apply(action).await;
    }

    /// Internet precondition for connect attempts
    ///
    /// True if no internet monitor is configured. Otherwise requires
    /// `internet_checks` consecutive Up reads spaced one check interval
    /// apart; the first non-Up read short-circuits to false.
    pub async fn internet_connected(&self) -> bool {
        let Some(monitor) = &self.internet else {
            return true;
        };

        for attempt in 0..self.timing.internet_checks {
            if attempt > 0 {
                sleep(self.timing.check_interval).await;
            }
            if monitor.get() != LinkState::Up {
                return false;
            }
        }

        true
    }

    /// Whether the tunnel is considered up
    ///
    /// The assigned-IP prefix must be present on some local address; when
    /// a liveness monitor is wired, `vpn_pings` consecutive Up reads are
    /// also required.
    async fn tunnel_up(&self, ips: &HashSet<String>) -> bool {
        if !netinfo::matches_prefix(ips, &self.assigned_prefix) {
            return false;
        }

        let Some(monitor) = &self.tunnel_monitor else {
            return true;
        };

        for attempt in 0..self.timing.vpn_pings {
            if attempt > 0 {
                sleep(self.timing.check_interval).await;
            }
            if monitor.get() != LinkState::Up {
                return false;
            }
        }

        true
    }

    fn shall_vpn(&self, ips: &HashSet<String>) -> bool {
        match self.mode {
            VpnMode::Auto => !netinfo::has_excluded_ip(ips, &self.exclude_prefixes),
            VpnMode::Connect => true,
            VpnMode::Disconnect => false,
        }
    }

    /// True while a recent launch still blocks a repeat in the same direction
    fn cooling_down(&self) -> bool {
        self.last_command
            .is_some_and(|at| at.elapsed() < self.timing.command_wait)
    }

    async fn apply(&mut self, action: TickAction) {
        match action {
            TickAction::SettleConnected => {
                self.phase = Some(VpnPhase::Connected);
                self.report(LinkState::Up);
            }
            TickAction::SettleDisconnected => {
                self.phase = Some(VpnPhase::Disconnected);
                self.report(LinkState::Down);
            }
            TickAction::LaunchConnect => {
                self.report(LinkState::Unknown);
                debug!(vpn = %self.id, "starting VPN");
                self.phase = Some(VpnPhase::Connecting);
                let cmd = self.connect_cmd.clone();
                self.launch(&cmd).await;
            }
            TickAction::LaunchDisconnect => {
                self.report(LinkState::Unknown);
                debug!(vpn = %self.id, "stopping VPN");
                self.phase = Some(VpnPhase::Disconnecting);
                let cmd = self.disconnect_cmd.clone();
                self.launch(&cmd).await;
            }
            TickAction::Hold => {}
        }
    }

    fn report(&self, state: LinkState) {
        self.state.set(state);
        self.sink.notify(&self.id, state);
    }

    /// Launch a command, consuming one cooldown window
    ///
    /// The timestamp advances on the launch attempt itself; a spawn
    /// failure or nonzero exit is only logged, the next retry happens
    /// after the cooldown elapses.
    async fn launch(&mut self, cmdline: &str) {
        self.last_command = Some(Instant::now());
        match command::run_command(cmdline).await {
            Ok(true) => debug!(vpn = %self.id, command = cmdline, "command succeeded"),
            Ok(false) => warn!(vpn = %self.id, command = cmdline, "command exited with failure"),
            Err(e) => warn!(vpn = %self.id, command = cmdline, error = %e, "command launch failed"),
        }
    }
}
